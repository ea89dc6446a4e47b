//! # pmsc — windowed multiplicative scatter correction
//!
//! `pmsc` removes multiplicative and additive scatter from spectra one
//! channel at a time. Each channel is corrected against a reference
//! spectrum using only a local window of neighbouring channels, so scatter
//! that varies along the spectrum is handled piecewise.
//!
//! ## Pipeline overview
//!
//! ```text
//! spectra.safetensors  (X: [m, n], r: [n])
//!   │
//!   ├─ io::SpectraData::load()      read X and r, widen to f64
//!   ├─ config::MscConfig            window (width or half-width) + strategy
//!   └─ correct()
//!        ├─ Strategy::Slope         slope::slope_correct       moving sums, reciprocal slope
//!        ├─ Strategy::BandManual    band::band_manual_correct  centred LS per band
//!        └─ Strategy::BandLsq       band::band_lsq_correct     LS with intercept per band
//!             │
//!             └─→ Array2<f64> [m, n]  corrected spectra
//! ```
//!
//! Windows are clipped at both ends of the spectrum: edge channels use fewer
//! samples instead of padding (see [`WindowSpan`]).
//!
//! ## Quick start
//!
//! ```
//! use pmsc::{correct, MscConfig, Strategy, Window};
//! use ndarray::{array, Array2};
//!
//! let r = array![1.0, 2.0, 3.0, 4.0, 5.0];
//! let x: Array2<f64> = array![[2.0, 4.1, 6.0, 7.9, 10.0]];
//!
//! let cfg = MscConfig { window: Window::Width(3), strategy: Strategy::Slope };
//! let z = correct(x.view(), r.view(), &cfg).unwrap();
//! assert_eq!(z.dim(), x.dim());
//! ```
//!
//! ## Moving statistics
//!
//! ```
//! use pmsc::{moving_mean, moving_std, Window};
//! use ndarray::array;
//!
//! let x = array![[1.0, 2.0, 3.0, 4.0]];
//! let mean = moving_mean(x.view(), Window::HalfWidth(1)).unwrap();
//! let std  = moving_std(x.view(), Window::Width(3)).unwrap();
//! assert_eq!(mean[[0, 0]], 1.5);
//! assert!(std[[0, 1]] > 0.0);
//! ```
//!
//! ## Degenerate windows
//!
//! `Slope` and `BandManual` fall back to the local reference mean when a
//! window has no usable slope (`|x| < 1e-10`). `BandLsq` has no such guard:
//! a constant reference band or a zero fitted slope yields `inf`/`NaN` in
//! the affected cells.

pub mod band;
pub mod config;
pub mod error;
pub mod io;
pub mod moving;
pub mod slope;
pub mod span;

use ndarray::{Array2, ArrayView1, ArrayView2};

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use config::{MscConfig, Strategy, Window};
pub use error::{MscError, Result, WindowKind};
pub use span::{band_sizes, WindowSpan};

pub use band::{band_lsq_correct, band_manual_correct};
pub use moving::{movmean, movmean_rows, movstd, movstd_rows, movsum, movsum_rows};
pub use slope::{slope_correct, ReferenceMoments};

pub use io::{SpectraData, StWriter};

/// Magnitude below which a slope, cross moment or reference variance is
/// treated as zero by the guarded correctors.
pub const DEGENERATE_EPS: f64 = 1e-10;

/// Correct the spectra in `x` (`[m, n]`) against the reference `r`
/// (length `n`).
///
/// Arguments are validated before anything is computed:
///
/// * `r.len()` must equal `x.ncols()`.
/// * The window must be positive; [`Strategy::BandLsq`] additionally needs
///   an odd [`Window::Width`].
///
/// The returned matrix has the shape of `x`, with every cell written.
///
/// # Errors
///
/// [`MscError::LengthMismatch`], [`MscError::NonPositiveWindow`] or
/// [`MscError::EvenWindow`]. Degenerate windows are not errors.
pub fn correct(x: ArrayView2<'_, f64>, r: ArrayView1<'_, f64>, cfg: &MscConfig) -> Result<Array2<f64>> {
    check_reference(x, r)?;
    let v = cfg.half_width()?;

    Ok(match cfg.strategy {
        Strategy::Slope => slope::slope_correct(x, r, v),
        Strategy::BandManual => band::band_manual_correct(x, r, v),
        Strategy::BandLsq => band::band_lsq_correct(x, r, v),
    })
}

/// Row-wise moving mean of `x`. Any positive window is accepted.
pub fn moving_mean(x: ArrayView2<'_, f64>, window: Window) -> Result<Array2<f64>> {
    let v = window.half_width(false)?;
    Ok(moving::movmean_rows(x, v))
}

/// Row-wise moving sample standard deviation of `x`.
///
/// A [`Window::Width`] must be odd. Cells whose clipped window holds a single
/// sample are `NaN`.
pub fn moving_std(x: ArrayView2<'_, f64>, window: Window) -> Result<Array2<f64>> {
    let v = window.half_width(true)?;
    Ok(moving::movstd_rows(x, v))
}

fn check_reference(x: ArrayView2<'_, f64>, r: ArrayView1<'_, f64>) -> Result<()> {
    if r.len() != x.ncols() {
        return Err(MscError::LengthMismatch {
            channels: x.ncols(),
            reference: r.len(),
        });
    }
    Ok(())
}
