// Extraction engine seam

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::{DownloadProgress, ProbeResult};
use super::policy::FormatPolicy;

/// Capability that resolves a media URL: metadata on request, a file on request
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Name of the engine (for logging)
    fn name(&self) -> &'static str;

    /// Metadata-only query. Must not write into the staging directory.
    ///
    /// `Ok(None)` means the engine finished but returned no info object.
    async fn probe(
        &self,
        url: &str,
        policy: &FormatPolicy,
    ) -> Result<Option<ProbeResult>, DownloadError>;

    /// Transfer plus post-processing into the policy's staging directory
    async fn download(
        &self,
        url: &str,
        policy: &FormatPolicy,
        progress: &dyn ProgressSink,
    ) -> Result<(), DownloadError>;
}

/// Receives progress samples during a download
pub trait ProgressSink: Send + Sync {
    fn update(&self, progress: &DownloadProgress, status: &str);

    fn finish(&self) {}
}

/// Discards progress
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _progress: &DownloadProgress, _status: &str) {}
}
