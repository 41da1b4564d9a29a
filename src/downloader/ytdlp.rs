// yt-dlp CLI engine

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command as TokioCommand;

use super::engine::{MediaEngine, ProgressSink};
use super::errors::DownloadError;
use super::models::{DownloadProgress, ProbeResult};
use super::policy::{FormatPolicy, PostProcess};
use super::utils::{run_output_with_timeout, spawn_error};

/// Machine-readable progress line requested through --progress-template
const PROGRESS_TEMPLATE: &str = concat!(
    "download:[progress] %(progress.downloaded_bytes)s ",
    "%(progress.total_bytes)s %(progress.total_bytes_estimate)s"
);

lazy_static::lazy_static! {
    static ref TEMPLATE_RE: Regex =
        Regex::new(r"^\[progress\]\s+(\S+)\s+(\S+)\s+(\S+)").unwrap();
    // [download]  12.5% of ~ 310.04MiB at  374.36KiB/s ETA 11:59
    static ref PERCENT_RE: Regex = Regex::new(r"\[download\]\s+(\d+\.?\d*)%").unwrap();
    static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
    static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").unwrap();
    static ref EXTRACT_RE: Regex = Regex::new(r"\[ExtractAudio\]\s+Destination").unwrap();
}

/// Subset of the `--dump-single-json` info object
#[derive(Debug, Deserialize)]
struct VideoInfoJson {
    title: Option<String>,
    duration: Option<f64>,
}

pub struct YtDlpEngine {
    ytdlp_path: PathBuf,
    socket_timeout_secs: u32,
    probe_timeout_secs: Option<u64>,
}

impl YtDlpEngine {
    pub fn new(ytdlp_path: PathBuf) -> Self {
        Self {
            ytdlp_path,
            socket_timeout_secs: 30,
            probe_timeout_secs: None,
        }
    }

    /// Passed to yt-dlp's own network client as `--socket-timeout`
    pub fn with_socket_timeout(mut self, seconds: u32) -> Self {
        self.socket_timeout_secs = seconds;
        self
    }

    /// Wall-clock limit for the probe process; unlimited when `None`
    pub fn with_probe_timeout(mut self, seconds: Option<u64>) -> Self {
        self.probe_timeout_secs = seconds;
        self
    }

    /// Arguments shared by probe and download
    fn build_args(&self, policy: &FormatPolicy) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.socket_timeout_secs.to_string(),
            "-f".to_string(),
            policy.format_spec.to_string(),
            "-o".to_string(),
            policy.output_template().to_string_lossy().to_string(),
        ];

        if let Some(ffmpeg) = &policy.transcoder {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.to_string_lossy().to_string());
        }

        match &policy.post_process {
            PostProcess::ExtractAudio { codec, bitrate_kbps } => {
                args.extend([
                    "-x".to_string(),
                    "--audio-format".to_string(),
                    codec.to_string(),
                    "--audio-quality".to_string(),
                    format!("{}K", bitrate_kbps),
                ]);
            }
            PostProcess::MergeInto(container) => {
                args.push("--merge-output-format".to_string());
                args.push(container.to_string());
                // A single-file fallback may still arrive as webm
                if policy.transcoder.is_some() {
                    args.push("--remux-video".to_string());
                    args.push(container.to_string());
                }
            }
        }

        args
    }

    fn probe_args(&self, url: &str, policy: &FormatPolicy) -> Vec<String> {
        let mut args = self.build_args(policy);
        args.push("--dump-single-json".to_string());
        args.push("--skip-download".to_string());
        args.push(url.to_string());
        args
    }

    fn download_args(&self, url: &str, policy: &FormatPolicy) -> Vec<String> {
        let mut args = self.build_args(policy);
        args.extend([
            "--newline".to_string(),
            "--progress".to_string(),
            "--progress-template".to_string(),
            PROGRESS_TEMPLATE.to_string(),
            url.to_string(),
        ]);
        args
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn probe(
        &self,
        url: &str,
        policy: &FormatPolicy,
    ) -> Result<Option<ProbeResult>, DownloadError> {
        let args = self.probe_args(url, policy);
        log::debug!("[yt-dlp] {} {}", self.ytdlp_path.display(), args.join(" "));

        let output =
            run_output_with_timeout(&self.ytdlp_path, &args, self.probe_timeout_secs).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::info!("[yt-dlp] Probe failed: {}", stderr.trim());
            return Err(DownloadError::extraction(&stderr));
        }

        parse_probe(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        policy: &FormatPolicy,
        progress: &dyn ProgressSink,
    ) -> Result<(), DownloadError> {
        let args = self.download_args(url, policy);
        log::debug!("[yt-dlp] {} {}", self.ytdlp_path.display(), args.join(" "));

        let mut child = TokioCommand::new(&self.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.ytdlp_path, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Io("Failed to capture stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Io("Failed to capture stderr".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        });

        // Titles may reach us in a legacy code page, so lines are decoded lossily
        let mut reader = BufReader::new(stdout);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw).await? == 0 {
                break;
            }
            let decoded = String::from_utf8_lossy(&raw);
            let line = decoded.trim_end();
            if let Some((sample, status)) = parse_progress(line) {
                progress.update(&sample, &status);
            }
            if line.contains("Destination") || line.contains("[Merger]") {
                log::info!("[yt-dlp] {}", line);
            }
        }

        let status = child.wait().await?;
        let stderr_bytes = stderr_task
            .await
            .map_err(|e| DownloadError::Io(format!("stderr task failed: {}", e)))??;
        let stderr_output = String::from_utf8_lossy(&stderr_bytes).into_owned();
        progress.finish();

        if status.success() {
            log::info!("[yt-dlp] Download finished");
            return Ok(());
        }

        log::warn!("[yt-dlp] Download failed ({}): {}", status, stderr_output.trim());
        if stderr_output.trim().is_empty() {
            return Err(DownloadError::Transfer(format!("yt-dlp exited with {}", status)));
        }
        Err(DownloadError::from(stderr_output))
    }
}

/// Parse `--dump-single-json` output. `null` or nothing means no info object.
fn parse_probe(stdout: &[u8]) -> Result<Option<ProbeResult>, DownloadError> {
    let json_str = String::from_utf8_lossy(stdout);
    let trimmed = json_str.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let info: Option<VideoInfoJson> = serde_json::from_str(trimmed)
        .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))?;

    Ok(info.map(|info| ProbeResult {
        title: info.title.unwrap_or_else(|| "Unknown".to_string()),
        duration_seconds: info.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
    }))
}

/// Parse one stdout line into a progress sample and a status string
fn parse_progress(line: &str) -> Option<(DownloadProgress, String)> {
    if let Some(caps) = TEMPLATE_RE.captures(line) {
        let downloaded = parse_count(caps.get(1)?.as_str());
        let total = parse_count(caps.get(2)?.as_str())
            .or_else(|| parse_count(caps.get(3)?.as_str()));

        let sample = match (downloaded, total) {
            (Some(done), Some(total)) => DownloadProgress::from_bytes(done, total),
            _ => DownloadProgress::default(),
        };
        let status = match sample.percent() {
            Some(p) => format!("Downloading {:.1}%", p),
            None => "Downloading...".to_string(),
        };
        return Some((sample, status));
    }

    if let Some(caps) = PERCENT_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        return Some((
            DownloadProgress::from_percent(percent),
            format!("Downloading {:.1}%", percent),
        ));
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name: String = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string())
            .chars()
            .take(50)
            .collect();
        return Some((DownloadProgress::default(), format!("Starting: {}", short_name)));
    }

    if MERGE_RE.is_match(line) {
        return Some((DownloadProgress::default(), "Merging video and audio...".to_string()));
    }

    if EXTRACT_RE.is_match(line) {
        return Some((DownloadProgress::default(), "Converting audio...".to_string()));
    }

    None
}

/// yt-dlp prints `NA` for unknown values and floats for estimates
fn parse_count(s: &str) -> Option<u64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64)
}
