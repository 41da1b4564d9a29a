use std::path::PathBuf;

use crate::cli::Args;
use crate::downloader::{FormatChoice, ToolLocator, ToolType};
use crate::session::Event;

/// Runtime settings, built once from the command line
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub initial_url: Option<String>,
    pub initial_format: Option<FormatChoice>,
    pub assume_yes: bool,
    pub save_dir: PathBuf,
    pub ytdlp_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    pub timeout_secs: u32,
    pub probe_timeout_secs: Option<u64>,
    pub verbosity: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_url: None,
            initial_format: None,
            assume_yes: false,
            save_dir: default_save_dir(),
            ytdlp_path: None,
            ffmpeg_path: None,
            timeout_secs: 30,
            probe_timeout_secs: None,
            verbosity: 0,
        }
    }
}

impl AppConfig {
    pub fn from_args(args: Args) -> Self {
        Self {
            initial_url: args.url,
            initial_format: args.format,
            assume_yes: args.yes,
            save_dir: args.save_dir.unwrap_or_else(default_save_dir),
            ytdlp_path: args.ytdlp,
            ffmpeg_path: args.ffmpeg,
            timeout_secs: args.timeout,
            probe_timeout_secs: args.probe_timeout,
            verbosity: args.verbose,
        }
    }

    pub fn interactive(&self) -> bool {
        !self.assume_yes
    }

    /// Default env_logger filter; RUST_LOG still wins
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    pub fn tool_locator(&self) -> ToolLocator {
        ToolLocator::from_env()
            .with_override(ToolType::YtDlp, self.ytdlp_path.clone())
            .with_override(ToolType::Ffmpeg, self.ffmpeg_path.clone())
    }

    /// Events implied by the command line, served before any prompt
    pub fn initial_events(&self) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(format) = self.initial_format {
            events.push(Event::FormatSelected(format));
        }
        if let Some(url) = &self.initial_url {
            events.push(Event::UrlSubmitted(url.clone()));
            if self.assume_yes {
                events.push(Event::ConfirmDownload);
            }
        }
        events
    }
}

pub fn default_save_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_initial_events_order() {
        let args = Args::try_parse_from([
            "youtube-fetcher",
            "--url",
            "https://youtu.be/XXXX",
            "--format",
            "mp3",
            "-y",
            "--save-dir",
            "/tmp/out",
        ])
        .unwrap();
        let config = AppConfig::from_args(args);

        assert!(!config.interactive());
        assert_eq!(config.save_dir, PathBuf::from("/tmp/out"));
        assert_eq!(
            config.initial_events(),
            vec![
                Event::FormatSelected(FormatChoice::Audio),
                Event::UrlSubmitted("https://youtu.be/XXXX".to_string()),
                Event::ConfirmDownload,
            ]
        );
    }

    #[test]
    fn test_no_events_without_url() {
        let config = AppConfig::default();
        assert!(config.initial_events().is_empty());
        assert!(config.interactive());
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_tool_overrides() {
        let config = AppConfig {
            ffmpeg_path: Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")),
            ..AppConfig::default()
        };
        assert_eq!(
            config.tool_locator().locate(ToolType::Ffmpeg),
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
    }
}
