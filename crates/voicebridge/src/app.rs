use crate::{AppCommand, AppResult, OutputHandler, StatusView};

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, instrument};
use voicebridge_core::{CaptureEvent, SessionManager};

/// Cadence of status-line redraws.
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Main application state.
///
/// Runs one `tokio::select!` loop over key commands, capture events, and
/// finished transcripts, dispatching everything into the session manager.
/// The manager itself stays single-threaded this way; no other task ever
/// touches it.
pub(crate) struct App {
    pub(crate) manager: SessionManager,
    pub(crate) output: OutputHandler,
    pub(crate) view: StatusView,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) event_rx: mpsc::Receiver<CaptureEvent>,
    pub(crate) transcript_rx: mpsc::Receiver<String>,
}

impl App {
    /// Run the main application event loop until shutdown is requested or
    /// every channel closes.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("VoiceBridge starting");
        self.view.print_hints()?;

        let mut redraw = tokio::time::interval(REDRAW_INTERVAL);

        loop {
            tokio::select! {
                Some(command) = self.command_rx.recv() => match command {
                    AppCommand::ToggleRecording => {
                        self.manager.toggle_recording().await;
                    }
                    AppCommand::CycleTheme => {
                        let next = self.manager.theme().cycled();
                        self.manager.observe_theme(next).await;
                    }
                    AppCommand::Shutdown => {
                        info!("Shutdown requested");
                        break;
                    }
                },

                Some(event) = self.event_rx.recv() => {
                    self.manager.on_capture_event(event).await;
                }

                Some(text) = self.transcript_rx.recv() => {
                    if let Err(e) = self.view.print_transcript(&text) {
                        error!(error = ?e, "Failed to print transcript");
                    }
                    self.output.deliver(&text);
                }

                _ = redraw.tick() => {
                    self.view.draw(&self.manager.state())?;
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        // The only full-teardown path: drops the capture handle and with it
        // the input device.
        self.manager.cleanup();
        info!("VoiceBridge shut down");

        Ok(())
    }
}
