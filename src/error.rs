//! Error type for argument validation.
//!
//! Only malformed arguments are errors. Degenerate windows (constant
//! reference, zero slope) are absorbed inside the correctors and never
//! surface here.
use std::fmt;

/// Which form of window parameter was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Full width `w`.
    Width,
    /// Half-width `v`.
    HalfWidth,
}

/// Error returned by the validated entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MscError {
    /// Window width or half-width was zero.
    NonPositiveWindow {
        /// Form of the parameter that was zero.
        kind: WindowKind,
    },

    /// Full width was even where the operation needs a centred window.
    EvenWindow {
        /// The rejected width.
        width: usize,
    },

    /// Reference length does not match the number of channels in `X`.
    LengthMismatch {
        /// Number of columns in `X`.
        channels: usize,
        /// Length of the reference vector.
        reference: usize,
    },
}

impl fmt::Display for MscError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MscError::NonPositiveWindow { kind: WindowKind::Width } => {
                write!(f, "window width must be a positive integer")
            }
            MscError::NonPositiveWindow { kind: WindowKind::HalfWidth } => {
                write!(f, "window half-width must be a positive integer")
            }
            MscError::EvenWindow { width } => {
                write!(f, "window width must be an odd positive integer, got {width}")
            }
            MscError::LengthMismatch { channels, reference } => write!(
                f,
                "reference vector length ({reference}) must match number of columns in X ({channels})"
            ),
        }
    }
}

impl std::error::Error for MscError {}

/// Result alias used throughout the numeric core.
pub type Result<T> = std::result::Result<T, MscError>;
