// Request-scoped staging directory
//
// The directory is removed when the StagingDir is dropped, on every exit path.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::errors::DownloadError;

const PREFIX: &str = "youtube-fetcher-";

pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Create under the system temp directory
    pub fn new() -> Result<Self, DownloadError> {
        let dir = tempfile::Builder::new().prefix(PREFIX).tempdir()?;
        log::debug!("[Staging] Created {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Regular files currently in the directory, sorted by name
    pub fn files(&self) -> Result<Vec<PathBuf>, DownloadError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(self.path())? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// First produced file, checked against the declared extension
    pub fn locate_artifact(&self, expected_ext: &str) -> Result<PathBuf, DownloadError> {
        let files = self.files()?;
        let first = files.first().cloned().ok_or(DownloadError::EmptyResult)?;

        if files.len() > 1 {
            log::warn!(
                "[Staging] {} files produced, using {}",
                files.len(),
                first.display()
            );
        }

        let actual = first
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();

        if !actual.eq_ignore_ascii_case(expected_ext) {
            let found = first
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            return Err(DownloadError::UnexpectedOutput {
                expected: expected_ext.to_string(),
                found,
            });
        }

        Ok(first)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        log::debug!("[Staging] Removing {}", self.dir.path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let staging = StagingDir::new().unwrap();
        let path = staging.path().to_path_buf();
        assert!(path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with(PREFIX)));
        std::fs::write(path.join("a.mp3"), b"x").unwrap();
        assert!(path.exists());
        drop(staging);
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_is_error() {
        let staging = StagingDir::new().unwrap();
        assert_eq!(staging.locate_artifact("mp3"), Err(DownloadError::EmptyResult));
    }

    #[test]
    fn test_first_file_sorted() {
        let staging = StagingDir::new().unwrap();
        std::fs::write(staging.path().join("b.mp4"), b"b").unwrap();
        std::fs::write(staging.path().join("a.MP4"), b"a").unwrap();
        std::fs::create_dir(staging.path().join("0-subdir")).unwrap();

        let artifact = staging.locate_artifact("mp4").unwrap();
        assert_eq!(artifact, staging.path().join("a.MP4"));
        assert_eq!(staging.files().unwrap().len(), 2);
    }

    #[test]
    fn test_wrong_extension_is_reported() {
        let staging = StagingDir::new().unwrap();
        std::fs::write(staging.path().join("Example.webm"), b"x").unwrap();
        assert_eq!(
            staging.locate_artifact("mp4"),
            Err(DownloadError::UnexpectedOutput {
                expected: "mp4".to_string(),
                found: "Example.webm".to_string(),
            })
        );
    }
}
