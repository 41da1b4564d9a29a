// Session state machine
//
// IDLE → URL_ENTERED → PROBING → {PROBE_FAILED | METADATA_SHOWN}
//   → (confirm) → DOWNLOADING → {DOWNLOAD_FAILED | ARTIFACT_READY}
//
// Every user action is an Event; applying it yields exactly one Action.

use crate::downloader::{DownloadError, DownloadedArtifact, FormatChoice, ProbeResult, Request};

pub const COMPLETE_MESSAGE: &str = "Download complete!";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    UrlEntered,
    Probing,
    ProbeFailed(DownloadError),
    MetadataShown(ProbeResult),
    Downloading,
    DownloadFailed(DownloadError),
    ArtifactReady(DownloadedArtifact),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    UrlSubmitted(String),
    FormatSelected(FormatChoice),
    ConfirmDownload,
    Quit,
}

/// Work the driver must perform after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Probe(Request),
    Download,
    None,
    Exit,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    url: Option<String>,
    format: FormatChoice,
    probe: Option<ProbeResult>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            url: None,
            format: FormatChoice::default(),
            probe: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn format(&self) -> FormatChoice {
        self.format
    }

    pub fn apply(&mut self, event: Event) -> Action {
        match event {
            Event::UrlSubmitted(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    self.url = None;
                    self.probe = None;
                    self.state = SessionState::Idle;
                    return Action::None;
                }
                self.url = Some(trimmed.to_string());
                self.state = SessionState::UrlEntered;
                self.begin_probe()
            }
            Event::FormatSelected(format) => {
                self.format = format;
                if self.url.is_some() {
                    self.begin_probe()
                } else {
                    Action::None
                }
            }
            Event::ConfirmDownload => match self.state {
                SessionState::MetadataShown(_) => {
                    self.state = SessionState::Downloading;
                    Action::Download
                }
                _ => Action::None,
            },
            Event::Quit => Action::Exit,
        }
    }

    fn begin_probe(&mut self) -> Action {
        let Some(url) = self.url.as_deref() else {
            return Action::None;
        };
        let request = Request::new(url, self.format);
        self.probe = None;
        self.state = SessionState::Probing;
        Action::Probe(request)
    }

    pub fn probe_finished(&mut self, result: Result<ProbeResult, DownloadError>) {
        if self.state != SessionState::Probing {
            log::warn!("[Session] Probe result ignored in state {:?}", self.state);
            return;
        }
        self.state = match result {
            Ok(info) => {
                self.probe = Some(info.clone());
                SessionState::MetadataShown(info)
            }
            Err(e) => SessionState::ProbeFailed(e),
        };
    }

    pub fn download_finished(&mut self, result: Result<DownloadedArtifact, DownloadError>) {
        if self.state != SessionState::Downloading {
            log::warn!("[Session] Download result ignored in state {:?}", self.state);
            return;
        }
        self.state = match result {
            Ok(artifact) => SessionState::ArtifactReady(artifact),
            Err(e) => SessionState::DownloadFailed(e),
        };
    }

    pub fn last_error(&self) -> Option<&DownloadError> {
        match &self.state {
            SessionState::ProbeFailed(e) | SessionState::DownloadFailed(e) => Some(e),
            _ => None,
        }
    }

    /// User-visible lines for the current state
    pub fn view(&self) -> Vec<String> {
        let metadata = || {
            self.probe
                .as_ref()
                .map(ProbeResult::display_lines)
                .unwrap_or_default()
        };

        match &self.state {
            SessionState::Idle | SessionState::UrlEntered | SessionState::Probing => Vec::new(),
            SessionState::ProbeFailed(e) => vec![e.user_message()],
            SessionState::MetadataShown(info) => info.display_lines(),
            SessionState::Downloading => metadata(),
            SessionState::DownloadFailed(e) => {
                let mut lines = metadata();
                lines.push(e.user_message());
                lines
            }
            SessionState::ArtifactReady(_) => {
                let mut lines = metadata();
                lines.push(COMPLETE_MESSAGE.to_string());
                lines
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
