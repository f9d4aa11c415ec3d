//! Display themes and the waveform colors derived from them.
//!
//! The theme itself is owned by the surrounding application; the session
//! manager only observes the current value and bakes the matching colors
//! into each capture handle it constructs.

/// An RGB color used by the waveform renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Colors baked into a capture handle at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformStyle {
    /// Color of the idle waveform bars.
    pub wave_color: Rgb,
    /// Color of the bars belonging to the in-progress capture.
    pub progress_color: Rgb,
}

/// Externally controlled display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light backgrounds, muted waveform grays.
    Light,
    /// Dark backgrounds, brighter progress blue.
    #[default]
    Dark,
}

impl Theme {
    /// Parse a theme name from configuration or CLI input.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The other theme, for toggle-style switching.
    pub fn cycled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Waveform colors for this theme.
    pub fn waveform_style(self) -> WaveformStyle {
        match self {
            Self::Dark => WaveformStyle {
                wave_color: Rgb(115, 115, 115),
                progress_color: Rgb(96, 165, 250),
            },
            Self::Light => WaveformStyle {
                wave_color: Rgb(163, 163, 163),
                progress_color: Rgb(59, 130, 246),
            },
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}
