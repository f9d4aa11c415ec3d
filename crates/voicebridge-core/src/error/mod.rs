use error_location::ErrorLocation;
use thiserror::Error;

/// Capture and transcription session errors with source location tracking.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A start was requested but no usable capture handle exists.
    #[error("Capture engine not ready {location}")]
    EngineNotReady {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Encoding captured samples into a WAV container failed.
    #[error("Audio encoding error: {reason} {location}")]
    EncodingFailed {
        /// Description of the encoding error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The transcription upload failed: transport error, non-success
    /// status, or a malformed response body.
    #[error("Transcription failed: {reason} {location}")]
    TranscriptionFailed {
        /// Description of the transcription failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;
