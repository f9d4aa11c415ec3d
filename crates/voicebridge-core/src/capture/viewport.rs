//! Shared waveform viewport.

use crate::theme::WaveformStyle;

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use tracing::error;

/// Most recent peak levels kept for display.
pub(crate) const MAX_LEVELS: usize = 64;

struct Inner {
    levels: VecDeque<f32>,
    style: WaveformStyle,
}

/// The screen region a capture engine renders into.
///
/// A bounded ring of recent peak levels (`0.0..=1.0`) plus the colors the
/// active engine was constructed with. Written from the audio callback
/// thread, read by the view; cloning shares the same region.
#[derive(Clone)]
pub struct WaveformViewport {
    inner: Arc<Mutex<Inner>>,
}

impl WaveformViewport {
    /// Create an empty viewport rendering with `style`.
    pub fn new(style: WaveformStyle) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                levels: VecDeque::with_capacity(MAX_LEVELS),
                style,
            })),
        }
    }

    /// Clear the level history and re-bake colors.
    ///
    /// Called when a freshly constructed engine binds to the viewport.
    pub fn rebind(&self, style: WaveformStyle) {
        let mut inner = self.lock();
        inner.levels.clear();
        inner.style = style;
    }

    /// Push one peak level; the oldest level falls off past [`MAX_LEVELS`].
    pub fn push_level(&self, level: f32) {
        let mut inner = self.lock();
        inner.levels.push_back(level.clamp(0.0, 1.0));
        while inner.levels.len() > MAX_LEVELS {
            inner.levels.pop_front();
        }
    }

    /// Snapshot of the current levels, oldest first.
    pub fn levels(&self) -> Vec<f32> {
        self.lock().levels.iter().copied().collect()
    }

    /// The colors the active engine was constructed with.
    pub fn style(&self) -> WaveformStyle {
        self.lock().style
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Recover from lock poison rather than losing the display state.
        // A poisoned mutex means a previous holder panicked, but the level
        // ring is still valid and usable.
        self.inner.lock().unwrap_or_else(|e| {
            error!("Viewport lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
