// Format policy - what to select, how to post-process, where to write

use std::path::{Path, PathBuf};

use super::models::FormatChoice;

/// Best audio-only stream, best overall as last resort
pub const AUDIO_FORMAT_SPEC: &str = "bestaudio/best";

/// MP4 video + M4A audio, then a combined MP4, then anything
pub const VIDEO_FORMAT_SPEC: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Target bitrate of the audio transcode
pub const AUDIO_BITRATE_KBPS: u32 = 192;

/// Output name relative to the staging directory
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Post-processing step requested from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcess {
    /// Extract audio and transcode it
    ExtractAudio { codec: &'static str, bitrate_kbps: u32 },
    /// Merge separate streams into this container
    MergeInto(&'static str),
}

/// Extraction/download configuration for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPolicy {
    pub format: FormatChoice,
    pub format_spec: &'static str,
    pub post_process: PostProcess,
    staging_dir: PathBuf,
    pub transcoder: Option<PathBuf>,
}

impl FormatPolicy {
    pub fn build(format: FormatChoice, staging_dir: &Path, transcoder: Option<PathBuf>) -> Self {
        let (format_spec, post_process) = match format {
            FormatChoice::Audio => (
                AUDIO_FORMAT_SPEC,
                PostProcess::ExtractAudio {
                    codec: "mp3",
                    bitrate_kbps: AUDIO_BITRATE_KBPS,
                },
            ),
            FormatChoice::Video => (VIDEO_FORMAT_SPEC, PostProcess::MergeInto("mp4")),
        };

        Self {
            format,
            format_spec,
            post_process,
            staging_dir: staging_dir.to_path_buf(),
            transcoder,
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// `<staging>/%(title)s.%(ext)s`
    pub fn output_template(&self) -> PathBuf {
        self.staging_dir.join(OUTPUT_TEMPLATE)
    }

    pub fn declared_extension(&self) -> &'static str {
        self.format.extension()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Audio extraction cannot finish without a transcoder
    pub fn requires_transcoder(&self) -> bool {
        matches!(self.post_process, PostProcess::ExtractAudio { .. })
    }
}
