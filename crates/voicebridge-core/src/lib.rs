//! VoiceBridge Core Library
//!
//! Session lifecycle for push-to-toggle voice input: owns the microphone
//! binding, serializes start/stop transitions, gates uploads on a minimum
//! capture size, and drives a remote transcription endpoint.
//!
//! # Example
//!
//! ```no_run
//! use voicebridge_core::{
//!     MicEngineFactory, SessionManager, Theme, TranscriptionClient, WaveformViewport,
//! };
//!
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let theme = Theme::Dark;
//!     let viewport = WaveformViewport::new(theme.waveform_style());
//!     let factory = MicEngineFactory::new(viewport.clone(), None);
//!     let client = TranscriptionClient::new("http://localhost:2024");
//!
//!     let (event_tx, mut event_rx) = mpsc::channel(32);
//!     let (transcript_tx, mut transcript_rx) = mpsc::channel(8);
//!
//!     let mut manager =
//!         SessionManager::new(Box::new(factory), Box::new(client), theme, event_tx, transcript_tx);
//!
//!     manager.toggle_recording().await;
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!     manager.toggle_recording().await;
//!
//!     while let Some(event) = event_rx.recv().await {
//!         manager.on_capture_event(event).await;
//!         if let Ok(text) = transcript_rx.try_recv() {
//!             println!("Transcribed: {}", text);
//!             break;
//!         }
//!     }
//!
//!     manager.cleanup();
//! }
//! ```

mod capture;
mod error;
mod session;
mod theme;
mod transcribe;

pub use {
    capture::{
        AudioBlob, CaptureEngine, CaptureEvent, EngineFactory, MicEngine, MicEngineFactory,
        WaveformViewport,
    },
    error::{Result as CoreResult, SessionError},
    session::{SessionManager, SessionState},
    theme::{Rgb, Theme, WaveformStyle},
    transcribe::{Transcriber, TranscriptionClient},
};

#[cfg(test)]
mod tests;
