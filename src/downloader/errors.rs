// Error types for the download workflow

use std::fmt;

use super::diagnostics::{diagnose_error, BlockingReason};

/// Prefix of every user-visible error line
pub const ERROR_PREFIX: &str = "Error: ";

/// Coarse failure category, logged with every rendered failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The URL does not resolve to extractable media
    Input,
    /// A required external tool is missing
    Environment,
    /// The transfer or post-processing failed
    Transfer,
    /// The transfer succeeded but produced no file
    EmptyResult,
    /// Post-processing produced a file of the wrong type
    UnexpectedOutput,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadError {
    /// Probe finished but the engine returned no info object
    NoInfo,

    /// Engine failed while extracting this URL
    Extraction {
        reason: Option<BlockingReason>,
        message: String,
    },

    /// Failed to parse yt-dlp JSON output
    ParseError(String),

    /// yt-dlp or ffmpeg not found
    ToolNotFound(String),

    /// Download call failed (network, disk or post-processing)
    Transfer(String),

    /// Probe did not finish in time
    Timeout(u64),

    /// Staging directory could not be created or read
    Io(String),

    /// Download succeeded but the staging directory is empty
    EmptyResult,

    /// Produced file does not have the declared extension
    UnexpectedOutput { expected: String, found: String },

    /// User pressed Ctrl-C while the engine was running
    Interrupted,
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoInfo | Self::Extraction { .. } | Self::ParseError(_) => ErrorKind::Input,
            Self::ToolNotFound(_) => ErrorKind::Environment,
            Self::Transfer(_) | Self::Timeout(_) | Self::Io(_) | Self::Interrupted => {
                ErrorKind::Transfer
            }
            Self::EmptyResult => ErrorKind::EmptyResult,
            Self::UnexpectedOutput { .. } => ErrorKind::UnexpectedOutput,
        }
    }

    /// Classify stderr of a failed probe
    pub fn extraction(stderr: &str) -> Self {
        match Self::from(stderr.to_string()) {
            Self::Transfer(message) => Self::Extraction {
                reason: diagnose_error(&message),
                message,
            },
            other => other,
        }
    }

    /// Single line for the error output control
    pub fn user_message(&self) -> String {
        format!("{}{}", ERROR_PREFIX, self)
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInfo => write!(f, "Could not fetch video information"),
            Self::Extraction { reason, message } => match reason {
                Some(r) if *r != BlockingReason::Unknown => {
                    write!(f, "{} ({})", summarize(message), r.label())
                }
                _ => write!(f, "{}", summarize(message)),
            },
            Self::ParseError(msg) => write!(f, "Parse error: {}", summarize(msg)),
            Self::ToolNotFound(tool) => write!(f, "Tool not found: {}", tool),
            Self::Transfer(msg) => write!(f, "{}", summarize(msg)),
            Self::Timeout(secs) => write!(f, "Timed out after {}s", secs),
            Self::Io(msg) => write!(f, "I/O error: {}", summarize(msg)),
            Self::EmptyResult => write!(f, "Download finished but produced no file"),
            Self::Interrupted => write!(f, "Interrupted"),
            Self::UnexpectedOutput { expected, found } => write!(
                f,
                "Post-processing produced unexpected output: expected .{}, got {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

// Classify raw yt-dlp stderr
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("ffmpeg not found")
            || lower.contains("ffprobe and ffmpeg not found")
            || lower.contains("ffmpeg is not installed")
        {
            return Self::ToolNotFound("ffmpeg".to_string());
        }

        if lower.contains("no such file or directory") && lower.contains("yt-dlp") {
            return Self::ToolNotFound("yt-dlp".to_string());
        }

        if lower.contains("unsupported url") || lower.contains("is not a valid url") {
            return Self::Extraction {
                reason: diagnose_error(&s),
                message: s,
            };
        }

        Self::Transfer(s)
    }
}

/// Reduce multi-line tool output to the most relevant single line
fn summarize(msg: &str) -> String {
    let lines: Vec<&str> = msg
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let line = lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .copied()
        .unwrap_or("");

    line.trim_start_matches("ERROR:").trim().to_string()
}
