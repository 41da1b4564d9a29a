use std::path::PathBuf;

use clap::Parser;

use crate::downloader::FormatChoice;

#[derive(Parser, Debug)]
#[command(name = "youtube-fetcher")]
#[command(version, about = "Fetch a video (MP4) or its audio (MP3) through yt-dlp")]
pub struct Args {
    /// Video URL to probe right away
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Output format: mp4 or mp3
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<FormatChoice>,

    /// Download without asking, save into --save-dir and exit
    #[arg(short = 'y', long, requires = "url")]
    pub yes: bool,

    /// Where downloaded files are saved (default: the user's download directory)
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// Path to the yt-dlp executable
    #[arg(long = "yt-dlp", env = "YTDLP_PATH", value_name = "PATH")]
    pub ytdlp: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[arg(long, env = "FFMPEG_PATH", value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Socket timeout handed to yt-dlp, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub timeout: u32,

    /// Kill the metadata lookup after this many seconds (no limit by default)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub probe_timeout: Option<u64>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let args = Args::try_parse_from([
            "youtube-fetcher",
            "--url",
            "https://youtu.be/XXXX",
            "--format",
            "mp3",
            "--yes",
            "--timeout",
            "10",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.url.as_deref(), Some("https://youtu.be/XXXX"));
        assert_eq!(args.format, Some(FormatChoice::Audio));
        assert!(args.yes);
        assert_eq!(args.timeout, 10);
        assert_eq!(args.probe_timeout, None);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_probe_timeout_is_opt_in() {
        let args =
            Args::try_parse_from(["youtube-fetcher", "--probe-timeout", "90"]).unwrap();
        assert_eq!(args.probe_timeout, Some(90));
        assert_eq!(args.timeout, 30);
        assert!(Args::try_parse_from(["youtube-fetcher", "--probe-timeout", "0"]).is_err());
    }

    #[test]
    fn test_yes_requires_url() {
        assert!(Args::try_parse_from(["youtube-fetcher", "--yes"]).is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Args::try_parse_from(["youtube-fetcher", "--format", "flac"]).is_err());
        assert!(Args::try_parse_from(["youtube-fetcher", "--timeout", "0"]).is_err());
    }
}
