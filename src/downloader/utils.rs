// Process helpers

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration as TokioDuration};

use super::errors::DownloadError;

/// Map a spawn failure, telling a missing executable apart
pub fn spawn_error(program: &Path, e: std::io::Error) -> DownloadError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DownloadError::ToolNotFound(program.display().to_string())
    } else {
        DownloadError::Transfer(format!("Failed to start {}: {}", program.display(), e))
    }
}

/// Run command to completion, collecting stdout and stderr.
///
/// With `timeout_secs` the process is killed once the limit passes.
pub async fn run_output_with_timeout(
    program: &Path,
    args: &[String],
    timeout_secs: Option<u64>,
) -> Result<std::process::Output, DownloadError> {
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
        DownloadError::Io(format!("Failed to capture stdout from {}", program.display()))
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
        DownloadError::Io(format!("Failed to capture stderr from {}", program.display()))
    })?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let status = match timeout_secs {
        Some(secs) => match timeout(TokioDuration::from_secs(secs), child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(DownloadError::Timeout(secs));
            }
        },
        None => child.wait().await?,
    };

    let stdout = stdout_task
        .await
        .map_err(|e| DownloadError::Io(format!("stdout task failed: {}", e)))??;
    let stderr = stderr_task
        .await
        .map_err(|e| DownloadError::Io(format!("stderr task failed: {}", e)))??;
    Ok(std::process::Output { status, stdout, stderr })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collects_output() {
        let out = run_output_with_timeout(
            Path::new("sh"),
            &["-c".to_string(), "echo out; echo err >&2".to_string()],
            None,
        )
        .await
        .unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout, b"out\n");
        assert_eq!(out.stderr, b"err\n");
    }

    #[tokio::test]
    async fn test_timeout() {
        let result =
            run_output_with_timeout(Path::new("sleep"), &["5".to_string()], Some(1)).await;
        assert_eq!(result.unwrap_err(), DownloadError::Timeout(1));
    }

    #[tokio::test]
    async fn test_no_limit_waits_for_slow_process() {
        let out = run_output_with_timeout(
            Path::new("sh"),
            &["-c".to_string(), "sleep 2; echo done".to_string()],
            None,
        )
        .await
        .unwrap();
        assert_eq!(out.stdout, b"done\n");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let result =
            run_output_with_timeout(Path::new("/nonexistent/yt-dlp"), &[], Some(1)).await;
        assert_eq!(
            result.unwrap_err(),
            DownloadError::ToolNotFound("/nonexistent/yt-dlp".to_string())
        );
    }
}
