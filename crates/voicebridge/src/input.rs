//! Terminal key input.
//!
//! Maps key presses to [`AppCommand`]s and forwards them from a blocking
//! crossterm reader to the application loop. Also owns the raw-mode guard
//! for the terminal.

use crate::{AppCommand, AppResult};

use crossterm::{
    event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

/// RAII guard that keeps the terminal in raw mode for its lifetime.
///
/// Raw mode is released on drop with best-effort semantics; if the release
/// fails, the shell's `reset` restores the terminal.
pub(crate) struct RawModeGuard;

impl RawModeGuard {
    /// Enter raw mode and return the guard that will leave it on drop.
    #[track_caller]
    pub(crate) fn new() -> AppResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Map one key event to a command, if any.
///
/// Only key presses count; repeats and releases are ignored so holding a
/// key does not toggle the session repeatedly.
pub(crate) fn map_key(key: KeyEvent) -> Option<AppCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char(' ') => Some(AppCommand::ToggleRecording),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(AppCommand::Shutdown)
        }
        KeyCode::Char('t') | KeyCode::Char('T') => Some(AppCommand::CycleTheme),
        KeyCode::Char('q') | KeyCode::Esc => Some(AppCommand::Shutdown),
        _ => None,
    }
}

/// Spawn the key forwarder on a single persistent blocking task.
///
/// crossterm's `event::read()` blocks, so the reader lives on its own
/// blocking task and forwards mapped commands over the channel.
///
/// Shutdown: a mapped `Shutdown` ends the loop after it is sent; if the
/// application drops the receiver first, the next `blocking_send` fails
/// and breaks the loop on the following key press.
pub(crate) fn spawn_input_forwarder(command_tx: mpsc::Sender<AppCommand>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        info!("Input forwarder started");

        loop {
            let event = match crossterm::event::read() {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = ?e, "Failed to read terminal event");
                    break;
                }
            };

            let Event::Key(key) = event else {
                continue;
            };
            let Some(command) = map_key(key) else {
                continue;
            };

            let is_shutdown = command == AppCommand::Shutdown;
            if command_tx.blocking_send(command).is_err() {
                break;
            }
            if is_shutdown {
                break;
            }
        }

        debug!("Input forwarder stopped");
    })
}
