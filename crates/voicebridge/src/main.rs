//! VoiceBridge: push-to-toggle voice input for an AI-agent chat backend.
//!
//! Captures microphone audio on a toggle key, renders a live waveform in
//! the terminal, uploads finished captures to the backend's transcription
//! endpoint, and delivers transcripts to stdout and the clipboard.

mod app;
mod command;
mod config;
mod error;
mod input;
mod output;
#[cfg(test)]
mod tests;
mod view;

pub(crate) use {
    app::App,
    command::AppCommand,
    error::{AppError, Result as AppResult},
    output::OutputHandler,
    view::StatusView,
};

use crate::{
    config::Config,
    input::{RawModeGuard, spawn_input_forwarder},
};

use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use voicebridge_core::{
    MicEngineFactory, SessionManager, Theme, TranscriptionClient, WaveformViewport,
};

/// Push-to-toggle voice input for an agent chat backend.
#[derive(Debug, Parser)]
#[command(name = "voicebridge", version)]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// Initial display theme: light or dark (overrides the config file)
    #[arg(long)]
    theme: Option<String>,

    /// Input device name (overrides the config file)
    #[arg(long)]
    device: Option<String>,
}

/// Application entry point.
#[tokio::main]
async fn main() -> std::process::ExitCode {
    // Logs go to stderr; stdout belongs to the status line and transcripts.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("voicebridge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!(error = ?e, "Fatal error");
        return std::process::ExitCode::FAILURE;
    }

    std::process::ExitCode::SUCCESS
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    config.apply_overrides(cli.server, cli.theme, cli.device);

    let theme = Theme::from_name(&config.ui.theme).unwrap_or_default();
    let viewport = WaveformViewport::new(theme.waveform_style());
    let factory = MicEngineFactory::new(viewport.clone(), config.audio.selected_device.clone());
    let client = TranscriptionClient::new(&config.server.base_url);

    let (event_tx, event_rx) = mpsc::channel(32);
    let (transcript_tx, transcript_rx) = mpsc::channel(8);
    let (command_tx, command_rx) = mpsc::channel(32);

    let manager = SessionManager::new(
        Box::new(factory),
        Box::new(client),
        theme,
        event_tx,
        transcript_tx,
    );

    let raw_mode = RawModeGuard::new()?;
    let input_handle = spawn_input_forwarder(command_tx);

    let app = App {
        manager,
        output: OutputHandler::new(),
        view: StatusView::new(viewport),
        command_rx,
        event_rx,
        transcript_rx,
    };

    let result = app.run().await;

    drop(raw_mode);

    // Best-effort join: the forwarder may still be blocked in read() if the
    // loop ended without a Shutdown key; it is cleaned up on process exit.
    match tokio::time::timeout(Duration::from_millis(200), input_handle).await {
        Ok(Ok(())) => debug!("Input forwarder stopped cleanly"),
        Ok(Err(e)) => error!(error = ?e, "Input forwarder task panicked"),
        Err(_) => debug!("Input forwarder did not stop within timeout"),
    }

    result
}
