// Common data models for the download workflow

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output format chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatChoice {
    /// Video+audio in an MP4 container
    #[default]
    Video,
    /// Audio only, transcoded to MP3
    Audio,
}

impl FormatChoice {
    /// Labels in the order the choice control shows them
    pub const LABELS: [&'static str; 2] = ["MP4", "MP3"];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Video => "MP4",
            Self::Audio => "MP3",
        }
    }

    /// Declared extension, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Video => "video/mp4",
            Self::Audio => "audio/mp3",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Video),
            1 => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Video => 0,
            Self::Audio => 1,
        }
    }
}

impl fmt::Display for FormatChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for FormatChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp4" | "video" => Ok(Self::Video),
            "mp3" | "audio" => Ok(Self::Audio),
            other => Err(format!("unknown format '{}', expected mp4 or mp3", other)),
        }
    }
}

/// One user interaction: the normalized URL and the format choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub format: FormatChoice,
}

impl Request {
    pub fn new(raw_url: &str, format: FormatChoice) -> Self {
        Self {
            url: super::url::normalize_url(raw_url.trim()),
            format,
        }
    }
}

/// Metadata returned by a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub title: String,
    pub duration_seconds: u64,
}

impl ProbeResult {
    /// The two informational lines
    pub fn display_lines(&self) -> Vec<String> {
        vec![
            format!("Title: {}", self.title),
            format!("Duration: {} seconds", self.duration_seconds),
        ]
    }
}

/// Downloaded file, held in memory once the staging directory is gone
#[derive(Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

impl DownloadedArtifact {
    pub fn new(bytes: Vec<u8>, probe: &ProbeResult, format: FormatChoice) -> Self {
        Self {
            bytes,
            file_name: format!("{}.{}", sanitize_file_stem(&probe.title), format.extension()),
            mime_type: format.mime_type(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Persist the bytes as `dir/<file_name>`
    pub fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

impl fmt::Debug for DownloadedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadedArtifact")
            .field("bytes", &self.bytes.len())
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Download progress sampled on each engine progress line
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DownloadProgress {
    pub total_bytes: Option<u64>,
    pub bytes_remaining: Option<u64>,
    /// Engine-reported percentage when byte counts are unknown
    pub reported_percent: Option<f32>,
}

impl DownloadProgress {
    pub fn from_bytes(downloaded: u64, total: u64) -> Self {
        Self {
            total_bytes: Some(total),
            bytes_remaining: Some(total.saturating_sub(downloaded)),
            reported_percent: None,
        }
    }

    pub fn from_percent(percent: f32) -> Self {
        Self {
            reported_percent: Some(percent),
            ..Self::default()
        }
    }

    /// `100 * (total - remaining) / total`, None when indeterminate
    pub fn percent(&self) -> Option<f32> {
        match (self.total_bytes, self.bytes_remaining) {
            (Some(total), Some(remaining)) if total > 0 => {
                Some(100.0 * total.saturating_sub(remaining) as f32 / total as f32)
            }
            _ => self.reported_percent,
        }
    }
}

/// Replace characters that cannot appear in a file name
pub fn sanitize_file_stem(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}
