//! The capture engine contract.
//!
//! The session manager owns at most one live engine at a time and talks to
//! it only through these traits; everything device-specific stays behind
//! them, and tests inject scripted doubles through the same seam.

use crate::{CoreResult, theme::WaveformStyle};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// WAV-encoded bytes of one finished capture.
///
/// Produced once per completed recording and consumed immediately by the
/// size check and, when accepted, the transcription upload. Not retained
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    bytes: Vec<u8>,
}

impl AudioBlob {
    /// Wrap encoded audio bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Size of the encoded audio in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Consume the blob, yielding the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Events emitted by a capture engine, exactly once each per
/// start/stop cycle.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// The input stream is live and samples are flowing.
    Started,
    /// The capture finished; carries the encoded audio.
    Ended(AudioBlob),
}

/// A live binding to an input device and its waveform renderer.
///
/// Implementations emit [`CaptureEvent`]s on the channel supplied at
/// construction. Dropping the engine releases the device.
#[async_trait]
pub trait CaptureEngine: Send {
    /// Begin capturing. Emits [`CaptureEvent::Started`] once the stream is
    /// live.
    ///
    /// # Errors
    ///
    /// Fails if device access is denied or the input stream cannot be built.
    async fn start(&mut self) -> CoreResult<()>;

    /// Request the end of the current capture.
    ///
    /// Completion is observed via [`CaptureEvent::Ended`], not via this
    /// call's return value.
    ///
    /// # Errors
    ///
    /// Fails if the captured samples cannot be encoded.
    async fn stop(&mut self) -> CoreResult<()>;

    /// Advisory permission probe: the number of visible input devices.
    ///
    /// A failure here is informational only; a later `start` attempt
    /// surfaces the real error.
    ///
    /// # Errors
    ///
    /// Fails if input devices cannot be enumerated.
    fn probe_devices(&self) -> CoreResult<usize>;
}

/// Constructs capture engines bound to one waveform viewport.
///
/// This is the session manager's construction seam: the handle is rebuilt
/// through it whenever the observed theme changes, because waveform colors
/// are baked in at construction time.
pub trait EngineFactory: Send {
    /// Build a fresh engine rendering with `style` and emitting events on
    /// `events`.
    ///
    /// # Errors
    ///
    /// Fails if no usable input device is available.
    fn create(
        &self,
        style: WaveformStyle,
        events: mpsc::Sender<CaptureEvent>,
    ) -> CoreResult<Box<dyn CaptureEngine>>;
}
