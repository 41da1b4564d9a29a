pub mod app;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod session;
pub mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use app::App;
use config::AppConfig;
use downloader::{DownloadError, Orchestrator, ToolType, YtDlpEngine};
use ui::TerminalFrontend;

pub fn run() -> anyhow::Result<ExitCode> {
    let config = AppConfig::from_args(cli::Args::parse());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();

    // One request at a time, on one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_app(config))
}

async fn run_app(config: AppConfig) -> anyhow::Result<ExitCode> {
    let locator = config.tool_locator();

    let ytdlp = locator.locate(ToolType::YtDlp).unwrap_or_else(|| {
        log::warn!("[Tools] yt-dlp not found, relying on PATH lookup at spawn time");
        PathBuf::from("yt-dlp")
    });
    let ffmpeg = locator.locate(ToolType::Ffmpeg);
    if ffmpeg.is_none() {
        log::warn!("[Tools] ffmpeg not found: MP3 downloads will be refused");
    }

    let engine = YtDlpEngine::new(ytdlp)
        .with_socket_timeout(config.timeout_secs)
        .with_probe_timeout(config.probe_timeout_secs);
    let orchestrator = Orchestrator::new(Box::new(engine), ffmpeg);

    let frontend = TerminalFrontend::new(
        config.initial_events(),
        config.interactive(),
        config.save_dir.clone(),
    );
    frontend.greet();

    let mut app = App::new(orchestrator, frontend);
    app.run().await;

    let interrupted = app.last_error() == Some(&DownloadError::Interrupted);
    if interrupted || (!config.interactive() && app.last_error().is_some()) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
