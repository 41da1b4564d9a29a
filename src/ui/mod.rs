// User-facing surface

pub mod terminal;

use std::path::PathBuf;

use crate::downloader::{DownloadError, DownloadedArtifact, ProgressSink};
use crate::session::{Event, Session};

pub use terminal::TerminalFrontend;

/// Renders controls and turns user input into session events
pub trait Frontend {
    /// Block until the user does something
    fn next_event(&mut self, session: &Session) -> Event;

    /// Informational and error lines for the current state
    fn render(&mut self, lines: &[String]);

    /// Progress indication for one download
    fn progress(&self) -> Box<dyn ProgressSink>;

    /// Save/export control. `Ok(None)` when the user declines.
    fn offer_artifact(
        &mut self,
        artifact: &DownloadedArtifact,
    ) -> Result<Option<PathBuf>, DownloadError>;
}
