// Downloader module - normalize, probe, download, hand over the bytes

pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod staging;
pub mod tools;
pub mod url;
pub mod utils;
pub mod ytdlp;

pub use engine::{MediaEngine, NoProgress, ProgressSink};
pub use errors::{DownloadError, ErrorKind};
pub use models::{DownloadProgress, DownloadedArtifact, FormatChoice, ProbeResult, Request};
pub use orchestrator::{Cycle, Orchestrator};
pub use policy::FormatPolicy;
pub use tools::{ToolLocator, ToolType};
pub use ytdlp::YtDlpEngine;
