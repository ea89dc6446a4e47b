//! Correction configuration.
//!
//! [`MscConfig`] holds the window parameter and the correction strategy.
//! Every field is `pub`; build one with struct-update syntax or start from
//! [`MscConfig::default()`].
use std::fmt;
use std::str::FromStr;

use crate::error::{MscError, Result, WindowKind};

/// Window parameter, given either as a full width or as a half-width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Full width `w`. The half-width is `(w - 1) / 2`, truncating, so an
    /// even width behaves like the next smaller odd one.
    Width(usize),
    /// Explicit half-width `v`: `v` channels on each side of the centre.
    HalfWidth(usize),
}

impl Window {
    /// Resolve to a half-width, rejecting zero and, when `require_odd` is
    /// set, even full widths.
    ///
    /// `require_odd` has no effect on [`Window::HalfWidth`], which always
    /// describes an odd `2v + 1` window.
    ///
    /// ```
    /// use pmsc::Window;
    /// assert_eq!(Window::Width(7).half_width(true).unwrap(), 3);
    /// assert_eq!(Window::Width(8).half_width(false).unwrap(), 3);
    /// assert!(Window::Width(8).half_width(true).is_err());
    /// ```
    pub fn half_width(self, require_odd: bool) -> Result<usize> {
        match self {
            Window::Width(0) => Err(MscError::NonPositiveWindow { kind: WindowKind::Width }),
            Window::HalfWidth(0) => Err(MscError::NonPositiveWindow { kind: WindowKind::HalfWidth }),
            Window::Width(w) if require_odd && w % 2 == 0 => Err(MscError::EvenWindow { width: w }),
            Window::Width(w) => Ok((w - 1) / 2),
            Window::HalfWidth(v) => Ok(v),
        }
    }
}

/// Which MSC formulation to apply per channel.
///
/// The three formulations use different division conventions and degenerate
/// case handling; they are deliberately kept separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Closed-form moving-sum pass ([`crate::slope::slope_correct`]).
    #[default]
    Slope,
    /// Per-band centred least squares ([`crate::band::band_manual_correct`]).
    BandManual,
    /// Per-band least squares with intercept via normal equations
    /// ([`crate::band::band_lsq_correct`]). Unguarded.
    BandLsq,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Slope, Strategy::BandManual, Strategy::BandLsq];

    /// Whether a full-width window must be odd for this strategy.
    pub fn requires_odd_width(self) -> bool {
        matches!(self, Strategy::BandLsq)
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Slope => "slope",
            Strategy::BandManual => "band-manual",
            Strategy::BandLsq => "band-lsq",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "slope" => Ok(Strategy::Slope),
            "band-manual" | "manual" => Ok(Strategy::BandManual),
            "band-lsq" | "lsq" => Ok(Strategy::BandLsq),
            other => Err(format!(
                "unknown strategy '{other}' (expected slope, band-manual or band-lsq)"
            )),
        }
    }
}

/// Configuration for [`crate::correct`].
///
/// ```
/// use pmsc::{MscConfig, Strategy, Window};
///
/// let cfg = MscConfig {
///     strategy: Strategy::BandManual,
///     window:   Window::HalfWidth(4),
/// };
/// assert_eq!(cfg.half_width().unwrap(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MscConfig {
    /// Local window around each channel.
    ///
    /// Default: `Window::Width(11)` (five channels on each side).
    pub window: Window,

    /// Correction formulation.
    ///
    /// Default: [`Strategy::Slope`].
    pub strategy: Strategy,
}

impl Default for MscConfig {
    fn default() -> Self {
        Self {
            window: Window::Width(11),
            strategy: Strategy::Slope,
        }
    }
}

impl MscConfig {
    /// Validated half-width for the configured strategy.
    pub fn half_width(&self) -> Result<usize> {
        self.window.half_width(self.strategy.requires_odd_width())
    }
}
