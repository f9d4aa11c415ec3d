//! The capture and transcription session manager.
//!
//! Owns the lifecycle of one capture engine, serializes start/stop requests
//! behind an in-flight guard, decides whether a finished capture is worth
//! transcribing, and rebuilds the engine when the observed theme changes.
//! Every failure is recovered locally into a displayable message; nothing
//! here propagates errors to the caller.

use crate::{
    capture::{AudioBlob, CaptureEngine, CaptureEvent, EngineFactory},
    theme::Theme,
    transcribe::Transcriber,
};

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Minimum capture size worth uploading.
///
/// The backend rejects anything under roughly 1 KiB as silence, and a
/// header-only WAV from a zero-length capture is 44 bytes; captures below
/// this size are discarded without error.
pub(crate) const MIN_TRANSCRIBE_BYTES: usize = 1000;

/// Wait after a lazy initialization before asking the engine to start.
///
/// The engine binds its input stream off the calling task; a start issued
/// in the same tick can race that binding and fail spuriously. 100ms is
/// reliable across the cpal backends; the engine exposes no explicit
/// ready signal to wait on instead.
pub(crate) const ENGINE_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Wait between tearing down a themed engine and rebuilding it.
pub(crate) const THEME_REBUILD_DELAY: Duration = Duration::from_millis(100);

/// User-facing message when the device permission probe fails.
pub(crate) const MSG_MIC_PERMISSION: &str =
    "Could not access microphone. Please grant permission.";

/// User-facing message when a start is requested without a usable engine.
pub(crate) const MSG_NOT_INITIALIZED: &str = "Audio recorder not initialized";

/// User-facing message when the engine refuses to start capturing.
pub(crate) const MSG_START_FAILED: &str =
    "Failed to start recording. Please check microphone permissions.";

/// User-facing message when the transcription upload fails.
pub(crate) const MSG_TRANSCRIBE_FAILED: &str = "Failed to transcribe audio. Please try again.";

/// Read-only session state exposed to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// A capture is in progress (between `Started` and `Ended` events).
    pub recording: bool,
    /// A transcription request for the most recent capture is outstanding.
    pub processing: bool,
    /// A usable capture handle exists.
    pub initialized: bool,
    /// Most recent user-facing failure, if any.
    pub last_error: Option<String>,
}

/// Owns the record -> upload -> transcript lifecycle.
///
/// Single-threaded cooperative: all methods take `&mut self` and are meant
/// to be driven from one event loop. The only concurrency guard needed is
/// the in-flight transition flag, which spans the await points inside
/// [`start_recording`](Self::start_recording).
pub struct SessionManager {
    factory: Box<dyn EngineFactory>,
    transcriber: Box<dyn Transcriber>,
    /// Latest observed theme; colors derive from it at each initialization.
    theme: Theme,
    /// The capture handle. At most one exists; `None` implies
    /// `initialized == false`.
    engine: Option<Box<dyn CaptureEngine>>,
    event_tx: mpsc::Sender<CaptureEvent>,
    transcript_tx: mpsc::Sender<String>,
    recording: bool,
    processing: bool,
    initialized: bool,
    last_error: Option<String>,
    /// A start-or-stop transition is currently in flight. No second
    /// transition may begin while set.
    op_in_flight: bool,
    /// Correlates log lines of the active capture.
    capture_id: Option<Uuid>,
    capture_started_at: Option<Instant>,
}

impl SessionManager {
    /// Create a manager that builds engines through `factory`, uploads
    /// accepted captures through `transcriber`, hands `event_tx` to every
    /// engine it constructs, and delivers transcripts on `transcript_tx`.
    ///
    /// The caller keeps the receiving ends and feeds capture events back in
    /// via [`on_capture_event`](Self::on_capture_event).
    pub fn new(
        factory: Box<dyn EngineFactory>,
        transcriber: Box<dyn Transcriber>,
        theme: Theme,
        event_tx: mpsc::Sender<CaptureEvent>,
        transcript_tx: mpsc::Sender<String>,
    ) -> Self {
        Self {
            factory,
            transcriber,
            theme,
            engine: None,
            event_tx,
            transcript_tx,
            recording: false,
            processing: false,
            initialized: false,
            last_error: None,
            op_in_flight: false,
            capture_id: None,
            capture_started_at: None,
        }
    }

    /// Snapshot of the state surface exposed to the UI.
    pub fn state(&self) -> SessionState {
        SessionState {
            recording: self.recording,
            processing: self.processing,
            initialized: self.initialized,
            last_error: self.last_error.clone(),
        }
    }

    /// The most recently observed theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Stop if recording, start if idle. A toggle received while a
    /// transition is in flight or a transcription is outstanding is a
    /// silent no-op, not an error; the caller retries once state settles.
    #[instrument(skip(self))]
    pub async fn toggle_recording(&mut self) {
        if self.recording {
            self.stop_recording().await;
        } else if !self.op_in_flight && !self.processing {
            self.start_recording().await;
        } else {
            debug!(
                op_in_flight = self.op_in_flight,
                processing = self.processing,
                "Toggle ignored while a transition is pending"
            );
        }
    }

    /// Destroy any prior capture handle and construct a fresh one with
    /// colors for the latest observed theme.
    ///
    /// The device permission probe afterwards is best-effort: a failure is
    /// surfaced as state but the handle stays usable, and the next start
    /// attempt reports the real error.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self) {
        self.last_error = None;

        // Dropping the previous engine releases its device before the new
        // one binds.
        self.engine = None;
        self.initialized = false;

        let style = self.theme.waveform_style();
        match self.factory.create(style, self.event_tx.clone()) {
            Ok(engine) => {
                self.engine = Some(engine);
                self.initialized = true;
                info!(theme = %self.theme, "Capture engine initialized");
            }
            Err(e) => {
                warn!(error = ?e, "Capture engine construction failed");
                return;
            }
        }

        if let Some(engine) = &self.engine {
            if let Err(e) = engine.probe_devices() {
                warn!(error = ?e, "Device permission probe failed");
                self.last_error = Some(MSG_MIC_PERMISSION.to_string());
            }
        }
    }

    /// Ask the engine to begin capturing.
    ///
    /// Re-entrant calls while a transition is in flight are ignored.
    /// Initializes lazily first, then waits [`ENGINE_SETTLE_DELAY`] for the
    /// engine to finish binding before accepting input.
    #[instrument(skip(self))]
    pub async fn start_recording(&mut self) {
        if self.op_in_flight {
            debug!("Start ignored; a transition is already in flight");
            return;
        }
        self.op_in_flight = true;
        self.last_error = None;

        if !self.initialized {
            self.initialize().await;
            tokio::time::sleep(ENGINE_SETTLE_DELAY).await;
        }

        let Some(engine) = self.engine.as_mut() else {
            warn!("Start requested with no usable capture handle");
            self.last_error = Some(MSG_NOT_INITIALIZED.to_string());
            self.op_in_flight = false;
            return;
        };

        let capture_id = Uuid::new_v4();
        match engine.start().await {
            Ok(()) => {
                // The guard stays set until the matching Ended event (or an
                // explicit stop request) is observed.
                self.capture_id = Some(capture_id);
                info!(capture_id = %capture_id, "Capture start requested");
            }
            Err(e) => {
                warn!(capture_id = %capture_id, error = ?e, "Capture start failed");
                self.last_error = Some(MSG_START_FAILED.to_string());
                self.op_in_flight = false;
            }
        }
    }

    /// Request the end of the active capture.
    ///
    /// Stopping is considered "requested" once this returns; completion is
    /// observed via the engine's `Ended` event, so the in-flight guard is
    /// cleared immediately.
    #[instrument(skip(self))]
    pub async fn stop_recording(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.stop().await {
                warn!(error = ?e, "Stop request failed");
            }
        }
        self.op_in_flight = false;
    }

    /// Apply an event emitted by the capture engine.
    pub async fn on_capture_event(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Started => self.on_capture_started(),
            CaptureEvent::Ended(blob) => self.on_capture_ended(blob).await,
        }
    }

    fn on_capture_started(&mut self) {
        self.recording = true;
        self.last_error = None;
        self.capture_started_at = Some(Instant::now());

        if let Some(id) = self.capture_id {
            info!(capture_id = %id, "Capture started");
        }
    }

    #[instrument(skip(self, blob))]
    async fn on_capture_ended(&mut self, blob: AudioBlob) {
        self.recording = false;
        self.op_in_flight = false;

        let capture_id = self.capture_id.take();
        if let (Some(id), Some(started_at)) = (capture_id, self.capture_started_at.take()) {
            info!(
                capture_id = %id,
                duration_ms = started_at.elapsed().as_millis(),
                blob_bytes = blob.size(),
                "Capture ended"
            );
        }

        // Accidental taps produce near-empty captures; discard them without
        // an upload and without an error.
        if blob.size() < MIN_TRANSCRIBE_BYTES {
            debug!(blob_bytes = blob.size(), "Discarding below-threshold capture");
            return;
        }

        self.processing = true;
        match self.transcriber.transcribe(blob).await {
            Ok(text) => {
                info!(text_len = text.len(), "Transcript received");
                if self.transcript_tx.send(text).await.is_err() {
                    warn!("Transcript receiver dropped; discarding text");
                }
            }
            Err(e) => {
                warn!(error = ?e, "Transcription failed");
                self.last_error = Some(MSG_TRANSCRIBE_FAILED.to_string());
            }
        }
        self.processing = false;
    }

    /// Observe the current theme.
    ///
    /// A change while idle tears the engine down and rebuilds it after
    /// [`THEME_REBUILD_DELAY`] so the waveform colors match. A change
    /// arriving mid-capture is only stored; the in-progress capture keeps
    /// its colors and the next idle initialization picks up the new value.
    #[instrument(skip(self))]
    pub async fn observe_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        self.theme = theme;

        if self.initialized && !self.recording {
            self.initialized = false;
            tokio::time::sleep(THEME_REBUILD_DELAY).await;
            self.initialize().await;
        } else {
            debug!(theme = %theme, "Theme change deferred until the next idle initialization");
        }
    }

    /// Destroy the capture handle and reset the lifecycle flags.
    ///
    /// Safe to call when no handle exists. An in-flight transcription is
    /// not aborted; its late result is still applied to the (now stale)
    /// state.
    #[instrument(skip(self))]
    pub fn cleanup(&mut self) {
        self.engine = None;
        self.initialized = false;
        self.op_in_flight = false;
        info!("Session cleaned up");
    }
}
