// Event loop: frontend events → session transitions → orchestrator work

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::downloader::{Cycle, DownloadError, Orchestrator};
use crate::session::{Action, Event, Session, SessionState};
use crate::ui::Frontend;

pub type InterruptFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Produces a future that resolves when the running probe or download must stop
pub type Interrupt = Box<dyn Fn() -> InterruptFuture>;

fn ctrl_c() -> InterruptFuture {
    Box::pin(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("[App] Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
}

pub struct App<F: Frontend> {
    session: Session,
    orchestrator: Orchestrator,
    frontend: F,
    cycle: Option<Cycle>,
    interrupt: Interrupt,
    last_error: Option<DownloadError>,
}

impl<F: Frontend> App<F> {
    pub fn new(orchestrator: Orchestrator, frontend: F) -> Self {
        Self {
            session: Session::new(),
            orchestrator,
            frontend,
            cycle: None,
            interrupt: Box::new(ctrl_c),
            last_error: None,
        }
    }

    /// Replace the Ctrl-C listener
    pub fn with_interrupt(mut self, interrupt: impl Fn() -> InterruptFuture + 'static) -> Self {
        self.interrupt = Box::new(interrupt);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Staging directory of the open cycle, if any
    pub fn staging_path(&self) -> Option<&Path> {
        self.cycle.as_ref().map(Cycle::staging_path)
    }

    /// Most recent failure of any kind, cleared by the next success
    pub fn last_error(&self) -> Option<&DownloadError> {
        self.last_error.as_ref()
    }

    pub async fn run(&mut self) {
        loop {
            let event = self.frontend.next_event(&self.session);
            if !self.dispatch(event).await {
                break;
            }
        }
        self.cycle = None;
    }

    /// Handle one event. Returns false once the session is over.
    ///
    /// An interrupt during a probe or download drops the cycle and ends the session.
    pub async fn dispatch(&mut self, event: Event) -> bool {
        log::debug!("[App] {:?} in {:?}", event, self.session.state());

        match self.session.apply(event) {
            Action::Exit => {
                self.cycle = None;
                return false;
            }
            Action::None => return true,
            Action::Probe(request) => {
                // Replacing the cycle removes the previous staging directory
                self.cycle = None;
                let result = match self.orchestrator.begin(request) {
                    Ok(mut cycle) => {
                        let interrupted = (self.interrupt)();
                        let result = tokio::select! {
                            result = self.orchestrator.probe(&mut cycle) => result,
                            _ = interrupted => Err(DownloadError::Interrupted),
                        };
                        if result.is_ok() {
                            self.cycle = Some(cycle);
                        }
                        result
                    }
                    Err(e) => Err(e),
                };
                self.session.probe_finished(result);
            }
            Action::Download => {
                // The cycle ends with the download either way
                let result = match self.cycle.take() {
                    Some(cycle) => {
                        let progress = self.frontend.progress();
                        let interrupted = (self.interrupt)();
                        let download = self.orchestrator.download(&cycle, progress.as_ref());
                        tokio::select! {
                            result = download => result,
                            _ = interrupted => {
                                progress.finish();
                                Err(DownloadError::Interrupted)
                            }
                        }
                    }
                    None => Err(DownloadError::NoInfo),
                };
                self.session.download_finished(result);
            }
        }

        self.last_error = self.session.last_error().cloned();
        if let Some(e) = &self.last_error {
            log::warn!("[App] {:?} failure: {}", e.kind(), e);
        }
        self.frontend.render(&self.session.view());

        if self.last_error == Some(DownloadError::Interrupted) {
            self.cycle = None;
            return false;
        }

        if let SessionState::ArtifactReady(artifact) = self.session.state() {
            match self.frontend.offer_artifact(artifact) {
                Ok(Some(path)) => log::info!("[App] Saved {}", path.display()),
                Ok(None) => log::info!("[App] Save declined"),
                Err(e) => {
                    log::warn!("[App] {:?} failure: {}", e.kind(), e);
                    self.frontend.render(&[e.user_message()]);
                    self.last_error = Some(e);
                }
            }
        }

        true
    }
}
