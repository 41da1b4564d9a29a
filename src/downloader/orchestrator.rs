// Orchestrator - probe, then download, inside one request cycle

use std::path::{Path, PathBuf};

use super::engine::{MediaEngine, ProgressSink};
use super::errors::DownloadError;
use super::models::{DownloadedArtifact, ProbeResult, Request};
use super::policy::FormatPolicy;
use super::staging::StagingDir;

/// One request cycle: the request, its staging directory and, once probed, its metadata.
///
/// Dropping the cycle removes the staging directory.
pub struct Cycle {
    request: Request,
    policy: FormatPolicy,
    probe: Option<ProbeResult>,
    staging: StagingDir,
}

impl Cycle {
    pub fn staging_path(&self) -> &Path {
        self.staging.path()
    }
}

pub struct Orchestrator {
    engine: Box<dyn MediaEngine>,
    transcoder: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(engine: Box<dyn MediaEngine>, transcoder: Option<PathBuf>) -> Self {
        Self { engine, transcoder }
    }

    /// Start a cycle: fresh staging directory and the policy rooted in it
    pub fn begin(&self, request: Request) -> Result<Cycle, DownloadError> {
        let staging = StagingDir::new()?;
        let policy = FormatPolicy::build(request.format, staging.path(), self.transcoder.clone());

        Ok(Cycle {
            request,
            policy,
            probe: None,
            staging,
        })
    }

    /// Metadata-only query; nothing is written to the staging directory
    pub async fn probe(&self, cycle: &mut Cycle) -> Result<ProbeResult, DownloadError> {
        log::info!(
            "[Orchestrator] Probing {} ({}) with {}",
            cycle.request.url,
            cycle.request.format,
            self.engine.name()
        );

        cycle.probe = None;
        let info = self
            .engine
            .probe(&cycle.request.url, &cycle.policy)
            .await?
            .ok_or(DownloadError::NoInfo)?;

        log::info!("[Orchestrator] ✓ {} ({}s)", info.title, info.duration_seconds);
        cycle.probe = Some(info.clone());
        Ok(info)
    }

    /// Fail early when the policy needs a transcoder that was not found
    pub fn check_environment(&self, policy: &FormatPolicy) -> Result<(), DownloadError> {
        if policy.requires_transcoder() && policy.transcoder.is_none() {
            return Err(DownloadError::ToolNotFound(
                "ffmpeg (required to convert audio to MP3)".to_string(),
            ));
        }
        Ok(())
    }

    /// Download into the cycle's staging directory and read the produced file
    pub async fn download(
        &self,
        cycle: &Cycle,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadedArtifact, DownloadError> {
        let probe = cycle.probe.as_ref().ok_or(DownloadError::NoInfo)?;
        self.check_environment(&cycle.policy)?;

        log::info!("[Orchestrator] Downloading {}", cycle.request.url);
        self.engine
            .download(&cycle.request.url, &cycle.policy, progress)
            .await?;

        let path = cycle
            .staging
            .locate_artifact(cycle.policy.declared_extension())?;
        let bytes = tokio::fs::read(&path).await?;
        log::info!("[Orchestrator] ✓ {} ({} bytes)", path.display(), bytes.len());

        Ok(DownloadedArtifact::new(bytes, probe, cycle.request.format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::engine::NoProgress;
    use crate::downloader::models::FormatChoice;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Engine that writes `files` into the staging directory on download
    struct StubEngine {
        info: Option<ProbeResult>,
        files: Vec<(&'static str, &'static [u8])>,
        downloads: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MediaEngine for StubEngine {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn probe(
            &self,
            _url: &str,
            _policy: &FormatPolicy,
        ) -> Result<Option<ProbeResult>, DownloadError> {
            Ok(self.info.clone())
        }

        async fn download(
            &self,
            _url: &str,
            policy: &FormatPolicy,
            _progress: &dyn ProgressSink,
        ) -> Result<(), DownloadError> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            for (name, bytes) in &self.files {
                std::fs::write(policy.staging_dir().join(name), bytes)?;
            }
            Ok(())
        }
    }

    fn example() -> ProbeResult {
        ProbeResult {
            title: "Example".to_string(),
            duration_seconds: 42,
        }
    }

    fn orchestrator(
        info: Option<ProbeResult>,
        files: Vec<(&'static str, &'static [u8])>,
        transcoder: Option<PathBuf>,
    ) -> (Orchestrator, Arc<AtomicUsize>) {
        let downloads = Arc::new(AtomicUsize::new(0));
        let engine = StubEngine {
            info,
            files,
            downloads: downloads.clone(),
        };
        (Orchestrator::new(Box::new(engine), transcoder), downloads)
    }

    #[tokio::test]
    async fn test_probe_leaves_staging_empty() {
        let (orch, _) = orchestrator(Some(example()), vec![], None);
        let mut cycle = orch
            .begin(Request::new("https://youtu.be/XXXX", FormatChoice::Video))
            .unwrap();

        assert_eq!(orch.probe(&mut cycle).await.unwrap(), example());
        assert_eq!(std::fs::read_dir(cycle.staging_path()).unwrap().count(), 0);
        assert_eq!(cycle.request.url, "https://youtube.com/watch?v=XXXX");
        assert_eq!(cycle.policy.staging_dir(), cycle.staging_path());
    }

    #[tokio::test]
    async fn test_no_info() {
        let (orch, _) = orchestrator(None, vec![], None);
        let mut cycle = orch
            .begin(Request::new("https://youtu.be/XXXX", FormatChoice::Video))
            .unwrap();
        assert_eq!(orch.probe(&mut cycle).await, Err(DownloadError::NoInfo));
        assert!(cycle.probe.is_none());
    }

    #[tokio::test]
    async fn test_download_requires_probe() {
        let (orch, downloads) = orchestrator(Some(example()), vec![("Example.mp4", b"x")], None);
        let cycle = orch
            .begin(Request::new("u", FormatChoice::Video))
            .unwrap();
        assert_eq!(
            orch.download(&cycle, &NoProgress).await,
            Err(DownloadError::NoInfo)
        );
        assert_eq!(downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_audio_download() {
        let (orch, _) = orchestrator(
            Some(example()),
            vec![("Example.mp3", b"ID3-audio")],
            Some(PathBuf::from("/usr/bin/ffmpeg")),
        );
        let mut cycle = orch.begin(Request::new("u", FormatChoice::Audio)).unwrap();
        orch.probe(&mut cycle).await.unwrap();

        let artifact = orch.download(&cycle, &NoProgress).await.unwrap();
        assert_eq!(artifact.file_name, "Example.mp3");
        assert_eq!(artifact.mime_type, "audio/mp3");

        let on_disk = std::fs::metadata(cycle.staging_path().join("Example.mp3")).unwrap();
        assert_eq!(artifact.len() as u64, on_disk.len());

        let path = cycle.staging_path().to_path_buf();
        drop(cycle);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_audio_without_transcoder_fails_before_transfer() {
        let (orch, downloads) = orchestrator(Some(example()), vec![("Example.mp3", b"x")], None);
        let mut cycle = orch.begin(Request::new("u", FormatChoice::Audio)).unwrap();
        orch.probe(&mut cycle).await.unwrap();

        let err = orch.download(&cycle, &NoProgress).await.unwrap_err();
        assert!(matches!(err, DownloadError::ToolNotFound(_)));
        assert_eq!(downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_result() {
        let (orch, _) = orchestrator(Some(example()), vec![], None);
        let mut cycle = orch.begin(Request::new("u", FormatChoice::Video)).unwrap();
        orch.probe(&mut cycle).await.unwrap();
        assert_eq!(
            orch.download(&cycle, &NoProgress).await,
            Err(DownloadError::EmptyResult)
        );
    }

    #[tokio::test]
    async fn test_unexpected_container() {
        let (orch, _) = orchestrator(Some(example()), vec![("Example.webm", b"x")], None);
        let mut cycle = orch.begin(Request::new("u", FormatChoice::Video)).unwrap();
        orch.probe(&mut cycle).await.unwrap();
        let err = orch.download(&cycle, &NoProgress).await.unwrap_err();
        assert!(matches!(err, DownloadError::UnexpectedOutput { .. }));
    }
}
