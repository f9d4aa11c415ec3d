//! Terminal status line rendering.
//!
//! Pure presentation: one line showing the session state and the waveform
//! strip read from the shared viewport, in the colors the active capture
//! handle was built with.

use crate::AppResult;

use std::io::{Stdout, Write, stdout};

use voicebridge_core::{Rgb, SessionState, WaveformViewport};

/// Glyph ramp for normalized levels, quiet to loud.
const LEVEL_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Columns of waveform history shown in the status line.
const WAVEFORM_WIDTH: usize = 24;

/// Renders the session state surface into the terminal.
pub(crate) struct StatusView {
    viewport: WaveformViewport,
    out: Stdout,
}

impl StatusView {
    pub(crate) fn new(viewport: WaveformViewport) -> Self {
        Self {
            viewport,
            out: stdout(),
        }
    }

    /// Print the one-time key hints.
    pub(crate) fn print_hints(&mut self) -> AppResult<()> {
        write!(self.out, "space: record / t: theme / q: quit\r\n")?;
        self.out.flush()?;
        Ok(())
    }

    /// Redraw the status line in place.
    pub(crate) fn draw(&mut self, state: &SessionState) -> AppResult<()> {
        let style = self.viewport.style();
        let color = if state.recording {
            style.progress_color
        } else {
            style.wave_color
        };
        let strip = waveform_glyphs(&self.viewport.levels(), WAVEFORM_WIDTH);

        write!(
            self.out,
            "\r\x1b[2K{}{}\x1b[0m {}",
            fg(color),
            strip,
            status_label(state)
        )?;
        self.out.flush()?;
        Ok(())
    }

    /// Print a finished transcript above the status line.
    pub(crate) fn print_transcript(&mut self, text: &str) -> AppResult<()> {
        write!(self.out, "\r\x1b[2K> {}\r\n", text)?;
        self.out.flush()?;
        Ok(())
    }
}

/// ANSI truecolor foreground escape for `color`.
fn fg(color: Rgb) -> String {
    format!("\x1b[38;2;{};{};{}m", color.0, color.1, color.2)
}

/// The most recent `width` levels as a fixed-width glyph strip,
/// left-padded with the quietest glyph.
pub(crate) fn waveform_glyphs(levels: &[f32], width: usize) -> String {
    let start = levels.len().saturating_sub(width);
    let recent = &levels[start..];

    let mut strip = String::with_capacity(width * 3);
    for _ in recent.len()..width {
        strip.push(LEVEL_GLYPHS[0]);
    }
    for &level in recent {
        let idx = ((level * (LEVEL_GLYPHS.len() - 1) as f32).round() as usize)
            .min(LEVEL_GLYPHS.len() - 1);
        strip.push(LEVEL_GLYPHS[idx]);
    }

    strip
}

/// One-line label for the current session state.
pub(crate) fn status_label(state: &SessionState) -> String {
    if let Some(error) = &state.last_error {
        format!("! {}", error)
    } else if state.recording {
        "recording (space to stop)".to_string()
    } else if state.processing {
        "transcribing...".to_string()
    } else {
        "idle (space to talk)".to_string()
    }
}
