// Terminal frontend: dialoguer prompts, indicatif progress, console styling

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use super::Frontend;
use crate::downloader::errors::ERROR_PREFIX;
use crate::downloader::{
    DownloadError, DownloadProgress, DownloadedArtifact, FormatChoice, ProgressSink,
};
use crate::session::{Event, Session, SessionState};

pub const APP_TITLE: &str = "YouTube Video Downloader";

pub struct TerminalFrontend {
    term: Term,
    theme: ColorfulTheme,
    pending: VecDeque<Event>,
    interactive: bool,
    save_dir: PathBuf,
    format_asked: bool,
}

impl TerminalFrontend {
    /// `pending` events are served before any prompt. Without `interactive`
    /// the frontend quits once they run out and saves artifacts unasked.
    pub fn new(pending: Vec<Event>, interactive: bool, save_dir: PathBuf) -> Self {
        Self {
            term: Term::stdout(),
            theme: ColorfulTheme::default(),
            pending: pending.into(),
            interactive,
            save_dir,
            format_asked: false,
        }
    }

    pub fn greet(&self) {
        let _ = self.term.write_line(&style(APP_TITLE).bold().to_string());
    }

    fn prompt(&mut self, session: &Session) -> dialoguer::Result<Event> {
        let format = session.format();
        if matches!(session.state(), SessionState::Idle | SessionState::UrlEntered) {
            // The format control is shown before every fresh URL
            if !self.format_asked {
                self.format_asked = true;
                return self.ask_format(format);
            }
            self.format_asked = false;
            return self.ask_url(format);
        }

        let entries = menu(session.state(), format);
        if entries.is_empty() {
            return Ok(Event::Quit);
        }
        let labels: Vec<&str> = entries.iter().map(|(label, _)| label.as_str()).collect();
        let index = Select::with_theme(&self.theme)
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()?;

        match entries.get(index).map(|(_, choice)| *choice) {
            Some(MenuChoice::Download) => Ok(Event::ConfirmDownload),
            Some(MenuChoice::ChangeFormat) => self.ask_format(format),
            Some(MenuChoice::NewUrl) => self.ask_url(format),
            Some(MenuChoice::Quit) | None => Ok(Event::Quit),
        }
    }

    fn ask_format(&self, current: FormatChoice) -> dialoguer::Result<Event> {
        let index = Select::with_theme(&self.theme)
            .with_prompt("Select Format")
            .items(&FormatChoice::LABELS)
            .default(current.index())
            .interact()?;
        Ok(Event::FormatSelected(
            FormatChoice::from_index(index).unwrap_or(current),
        ))
    }

    fn ask_url(&self, format: FormatChoice) -> dialoguer::Result<Event> {
        let url: String = Input::with_theme(&self.theme)
            .with_prompt(url_prompt(format))
            .allow_empty(true)
            .interact_text()?;
        if url.trim().is_empty() {
            return Ok(Event::Quit);
        }
        Ok(Event::UrlSubmitted(url))
    }

    fn ask_save_dir(&self, artifact: &DownloadedArtifact) -> dialoguer::Result<Option<PathBuf>> {
        let save = Confirm::with_theme(&self.theme)
            .with_prompt(format!(
                "Save {} ({} bytes, {})?",
                artifact.file_name,
                artifact.len(),
                artifact.mime_type
            ))
            .default(true)
            .interact()?;
        if !save {
            return Ok(None);
        }

        let dir: String = Input::with_theme(&self.theme)
            .with_prompt("Save to directory")
            .default(self.save_dir.to_string_lossy().to_string())
            .interact_text()?;
        Ok(Some(PathBuf::from(dir)))
    }
}

impl Frontend for TerminalFrontend {
    fn next_event(&mut self, session: &Session) -> Event {
        if let Some(event) = self.pending.pop_front() {
            return event;
        }
        if !self.interactive {
            return Event::Quit;
        }
        match self.prompt(session) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("[Terminal] Input failed: {}", e);
                Event::Quit
            }
        }
    }

    fn render(&mut self, lines: &[String]) {
        for line in lines {
            let styled = if line.starts_with(ERROR_PREFIX) {
                style(line).red().to_string()
            } else {
                line.clone()
            };
            let _ = self.term.write_line(&styled);
        }
    }

    fn progress(&self) -> Box<dyn ProgressSink> {
        Box::new(TerminalProgress::new())
    }

    fn offer_artifact(
        &mut self,
        artifact: &DownloadedArtifact,
    ) -> Result<Option<PathBuf>, DownloadError> {
        let dir = if self.interactive {
            match self.ask_save_dir(artifact) {
                Ok(Some(dir)) => dir,
                Ok(None) => return Ok(None),
                Err(e) => return Err(DownloadError::Io(e.to_string())),
            }
        } else {
            self.save_dir.clone()
        };

        let path = artifact.save_to(&dir)?;
        let _ = self
            .term
            .write_line(&format!("Saved to {}", style(path.display()).green()));
        Ok(Some(path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Download,
    ChangeFormat,
    NewUrl,
    Quit,
}

fn url_prompt(format: FormatChoice) -> String {
    format!("Enter YouTube Video URL [{}] (empty to quit)", format)
}

/// Follow-up actions for a settled state; every entry list shows the current format
fn menu(state: &SessionState, format: FormatChoice) -> Vec<(String, MenuChoice)> {
    let change = (format!("Change format (current: {})", format), MenuChoice::ChangeFormat);
    let new_url = (format!("Enter another URL ({})", format), MenuChoice::NewUrl);
    let quit = ("Quit".to_string(), MenuChoice::Quit);

    match state {
        SessionState::MetadataShown(_) => vec![
            ("Download".to_string(), MenuChoice::Download),
            change,
            new_url,
            quit,
        ],
        SessionState::ProbeFailed(_) => vec![change, new_url, quit],
        SessionState::ArtifactReady(_) | SessionState::DownloadFailed(_) => {
            vec![new_url, change, quit]
        }
        SessionState::Idle
        | SessionState::UrlEntered
        | SessionState::Probing
        | SessionState::Downloading => Vec::new(),
    }
}

/// Spinner until the total size is known, then a percentage bar
struct TerminalProgress {
    bar: ProgressBar,
    determinate: AtomicBool,
}

impl TerminalProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(spinner);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message("Downloading...");
        Self {
            bar,
            determinate: AtomicBool::new(false),
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&self, progress: &DownloadProgress, status: &str) {
        if let Some(percent) = progress.percent() {
            if !self.determinate.swap(true, Ordering::Relaxed) {
                self.bar.set_length(100);
                if let Ok(bar_style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                {
                    self.bar.set_style(bar_style.progress_chars("#>-"));
                }
            }
            self.bar.set_position(percent.clamp(0.0, 100.0).round() as u64);
        }
        self.bar.set_message(status.to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::ProbeResult;

    fn labels(state: &SessionState, format: FormatChoice) -> Vec<String> {
        menu(state, format).into_iter().map(|(label, _)| label).collect()
    }

    #[test]
    fn test_every_menu_shows_format() {
        let states = [
            SessionState::MetadataShown(ProbeResult {
                title: "Example".to_string(),
                duration_seconds: 42,
            }),
            SessionState::ProbeFailed(DownloadError::NoInfo),
            SessionState::DownloadFailed(DownloadError::EmptyResult),
            SessionState::ArtifactReady(DownloadedArtifact::new(
                vec![1, 2, 3],
                &ProbeResult {
                    title: "Example".to_string(),
                    duration_seconds: 42,
                },
                FormatChoice::Audio,
            )),
        ];
        for state in &states {
            let shown = labels(state, FormatChoice::Audio);
            assert!(shown.iter().any(|l| l == "Change format (current: MP3)"), "{:?}", state);
            assert!(shown.iter().any(|l| l == "Enter another URL (MP3)"), "{:?}", state);
        }
        assert_eq!(
            url_prompt(FormatChoice::Video),
            "Enter YouTube Video URL [MP4] (empty to quit)"
        );
    }

    #[test]
    fn test_download_only_after_metadata() {
        let shown = SessionState::MetadataShown(ProbeResult {
            title: "Example".to_string(),
            duration_seconds: 42,
        });
        assert_eq!(menu(&shown, FormatChoice::Video)[0].1, MenuChoice::Download);

        let failed = menu(&SessionState::ProbeFailed(DownloadError::NoInfo), FormatChoice::Video);
        assert!(!failed.iter().any(|(_, c)| *c == MenuChoice::Download));
        assert!(menu(&SessionState::Probing, FormatChoice::Video).is_empty());
    }
}
