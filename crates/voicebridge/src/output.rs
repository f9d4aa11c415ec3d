//! Transcript delivery.
//!
//! Transcripts always print to the terminal; the clipboard copy is
//! best-effort so a headless session still works.

use arboard::Clipboard;
use tracing::{debug, info, instrument, warn};

/// Delivers finished transcripts to the clipboard.
pub(crate) struct OutputHandler {
    clipboard: Option<Clipboard>,
}

impl OutputHandler {
    /// Create an output handler, degrading to print-only when no clipboard
    /// is available.
    #[instrument]
    pub(crate) fn new() -> Self {
        let clipboard = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                warn!(error = ?e, "Clipboard unavailable; transcripts will print only");
                None
            }
        };

        info!(
            clipboard = clipboard.is_some(),
            "OutputHandler initialized"
        );

        Self { clipboard }
    }

    /// Copy a transcript for pasting into the chat composer.
    #[instrument(skip(self, text))]
    pub(crate) fn deliver(&mut self, text: &str) {
        let Some(clipboard) = &mut self.clipboard else {
            return;
        };

        match clipboard.set_text(text) {
            Ok(()) => debug!(text_len = text.len(), "Transcript copied to clipboard"),
            Err(e) => warn!(error = ?e, "Clipboard write failed"),
        }
    }
}
