//! Transcription upload client.
//!
//! One multipart POST per accepted capture. Transport failures, non-success
//! status codes, and malformed response bodies all collapse into the same
//! failure outcome; there are no partial or streamed results.

use crate::{SessionError, capture::AudioBlob, error::Result as CoreResult};

use std::panic::Location;

use async_trait::async_trait;
use error_location::ErrorLocation;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Multipart form field carrying the audio payload.
const UPLOAD_FIELD: &str = "audio";

/// Filename reported for the uploaded capture.
const UPLOAD_FILE_NAME: &str = "recording.wav";

/// MIME type of the uploaded capture.
const UPLOAD_MIME: &str = "audio/wav";

/// Turns a finished capture into transcript text.
///
/// The session manager drives this through a trait object so tests can
/// substitute a scripted double for the HTTP client.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one capture.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success responses, and malformed
    /// response payloads.
    async fn transcribe(&self, audio: AudioBlob) -> CoreResult<String>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranscribeResponse {
    pub(crate) transcription: String,
}

/// HTTP client for the backend's `/api/transcribe` endpoint.
pub struct TranscriptionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TranscriptionClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str) -> Self {
        let endpoint = format!("{}/api/transcribe", base_url.trim_end_matches('/'));

        debug!(endpoint = %endpoint, "TranscriptionClient initialized");

        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transcriber for TranscriptionClient {
    #[instrument(skip(self, audio))]
    async fn transcribe(&self, audio: AudioBlob) -> CoreResult<String> {
        let blob_bytes = audio.size();

        let part = Part::bytes(audio.into_bytes())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(UPLOAD_MIME)
            .map_err(|e| SessionError::TranscriptionFailed {
                reason: format!("Failed to build upload part: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SessionError::TranscriptionFailed {
                reason: format!("Request failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::TranscriptionFailed {
                reason: format!("Server returned {}", status),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let body: TranscribeResponse =
            response
                .json()
                .await
                .map_err(|e| SessionError::TranscriptionFailed {
                    reason: format!("Malformed response: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        info!(
            blob_bytes = blob_bytes,
            text_len = body.transcription.len(),
            "Transcription received"
        );

        Ok(body.transcription)
    }
}
