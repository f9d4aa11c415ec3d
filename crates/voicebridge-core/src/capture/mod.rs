pub(crate) mod device;
mod engine;
pub(crate) mod viewport;

pub use {
    device::{MicEngine, MicEngineFactory},
    engine::{AudioBlob, CaptureEngine, CaptureEvent, EngineFactory},
    viewport::WaveformViewport,
};
