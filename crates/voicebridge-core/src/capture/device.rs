//! Microphone capture engine over cpal.

use crate::{
    SessionError,
    capture::{AudioBlob, CaptureEngine, CaptureEvent, EngineFactory, WaveformViewport},
    error::Result as CoreResult,
    theme::WaveformStyle,
};

use std::{
    collections::VecDeque,
    io::Cursor,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Maximum samples to buffer (5 minutes at 48kHz mono).
/// Prevents unbounded memory growth during long recordings.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// One level sample is pushed to the viewport per callback buffer; cpal
/// delivers buffers every few milliseconds, which is plenty for a terminal
/// waveform.
pub(crate) fn peak_level(data: &[f32]) -> f32 {
    data.iter().fold(0.0f32, |acc, s| acc.max(s.abs())).min(1.0)
}

/// Capture engine bound to a microphone and a [`WaveformViewport`].
///
/// Buffers `f32` samples from the stream callback and, on stop, encodes
/// them into a 16-bit WAV blob delivered via [`CaptureEvent::Ended`].
pub struct MicEngine {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so that no in-flight callback writes after the
    /// lock is acquired in `stop()`.
    shutdown: Arc<AtomicBool>,
    viewport: WaveformViewport,
    events: mpsc::Sender<CaptureEvent>,
}

impl MicEngine {
    /// Bind to the named input device, or the default one when `device_name`
    /// is `None`, and take over the viewport with `style`.
    ///
    /// # Errors
    ///
    /// Returns an error if no matching input device exists or its
    /// configuration cannot be read.
    #[track_caller]
    #[instrument(skip(viewport, events))]
    pub fn new(
        viewport: WaveformViewport,
        device_name: Option<&str>,
        style: WaveformStyle,
        events: mpsc::Sender<CaptureEvent>,
    ) -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| SessionError::DeviceError {
                    reason: format!("Failed to enumerate devices: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == name)
                        .unwrap_or(false)
                })
                .ok_or(SessionError::NoMicrophoneFound {
                    location: ErrorLocation::from(Location::caller()),
                })?,
            None => host
                .default_input_device()
                .ok_or(SessionError::NoMicrophoneFound {
                    location: ErrorLocation::from(Location::caller()),
                })?,
        };

        let config = device
            .default_input_config()
            .map_err(|e| SessionError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "MicEngine initialized"
        );

        viewport.rebind(style);

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_BUFFER_SAMPLES))),
            shutdown: Arc::new(AtomicBool::new(false)),
            viewport,
            events,
        })
    }
}

#[async_trait]
impl CaptureEngine for MicEngine {
    #[instrument(skip(self))]
    async fn start(&mut self) -> CoreResult<()> {
        let samples = Arc::clone(&self.samples);
        let shutdown = Arc::clone(&self.shutdown);
        let viewport = self.viewport.clone();

        // Reset shutdown flag for the new capture cycle
        self.shutdown.store(false, Ordering::Release);

        // Clear samples left over from the previous cycle
        samples
            .lock()
            .unwrap_or_else(|e| {
                error!("Sample buffer lock poisoned, recovering: {}", e);
                e.into_inner()
            })
            .clear();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Check the shutdown flag before acquiring the lock: once
                    // stop() sets it, no new samples may be written even if
                    // cpal fires one more callback before the stream drops.
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // Recover from lock poison rather than silently dropping
                    // audio; the VecDeque data is still valid and usable.
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    buf.extend(data.iter().copied());
                    while buf.len() > MAX_BUFFER_SAMPLES {
                        buf.pop_front();
                    }
                    drop(buf);
                    viewport.push_level(peak_level(data));
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| SessionError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| SessionError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        info!("Audio capture started");

        if self.events.send(CaptureEvent::Started).await.is_err() {
            warn!("Capture event receiver dropped; Started event lost");
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&mut self) -> CoreResult<()> {
        // Signal the callback to stop writing BEFORE dropping the stream:
        // even if cpal's Stream::drop() is asynchronous on some backend, the
        // callback observes the flag and returns early, so no write happens
        // after we acquire the lock below.
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Brief yield so any in-flight callback observes the shutdown
            // flag and completes. On most cpal backends drop() joins the
            // audio thread synchronously and this wait is redundant.
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            info!("Audio capture stopped");
        }

        let samples: Vec<f32> = self
            .samples
            .lock()
            .unwrap_or_else(|e| {
                error!("Sample buffer lock poisoned, recovering: {}", e);
                e.into_inner()
            })
            .iter()
            .copied()
            .collect();

        debug!(sample_count = samples.len(), "Captured audio samples");

        let blob = encode_wav(&samples, self.config.sample_rate, self.config.channels)?;

        if self.events.send(CaptureEvent::Ended(blob)).await.is_err() {
            warn!("Capture event receiver dropped; Ended event lost");
        }

        Ok(())
    }

    fn probe_devices(&self) -> CoreResult<usize> {
        let host = cpal::default_host();
        let devices = host.input_devices().map_err(|e| SessionError::DeviceError {
            reason: format!("Failed to enumerate devices: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(devices.count())
    }
}

/// Encode `f32` samples into a 16-bit PCM WAV container.
///
/// An empty capture still yields a valid (header-only) WAV; the session
/// manager's size gate discards it downstream.
#[track_caller]
pub(crate) fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> CoreResult<AudioBlob> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    let mut writer =
        WavWriter::new(Cursor::new(&mut bytes), spec).map_err(|e| SessionError::EncodingFailed {
            reason: format!("Failed to create WAV writer: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(quantized)
            .map_err(|e| SessionError::EncodingFailed {
                reason: format!("Failed to write sample: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
    }

    writer.finalize().map_err(|e| SessionError::EncodingFailed {
        reason: format!("Failed to finalize WAV: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    debug!(
        sample_count = samples.len(),
        wav_bytes = bytes.len(),
        "Encoded capture"
    );

    Ok(AudioBlob::new(bytes))
}

/// Builds [`MicEngine`]s bound to one viewport and device selection.
pub struct MicEngineFactory {
    viewport: WaveformViewport,
    device_name: Option<String>,
}

impl MicEngineFactory {
    /// Create a factory binding engines to `viewport` and the named device
    /// (default device when `None`).
    pub fn new(viewport: WaveformViewport, device_name: Option<String>) -> Self {
        Self {
            viewport,
            device_name,
        }
    }
}

impl EngineFactory for MicEngineFactory {
    fn create(
        &self,
        style: WaveformStyle,
        events: mpsc::Sender<CaptureEvent>,
    ) -> CoreResult<Box<dyn CaptureEngine>> {
        let engine = MicEngine::new(
            self.viewport.clone(),
            self.device_name.as_deref(),
            style,
            events,
        )?;

        Ok(Box::new(engine))
    }
}
