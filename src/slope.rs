//! Closed-form windowed MSC from moving sums.
//!
//! For half-width `v` and the clipped band of channel `j`:
//!
//! ```text
//! Denom[j]   = Σ r²      − 2·rmean·rsum       + rmean²·esum
//! Numer[i,j] = Σ X[i]·r  − (Σ X[i])·rmean − Xmean·rsum + Xmean·rmean·esum
//! Slope[i,j] = Denom / Numer          (0 when |Numer| < 1e-10)
//! Z[i,j]     = (X[i,j] − Xmean[i,j]) · Slope[i,j] + rmean[j]
//! ```
//!
//! `Denom` is the centred second moment of `r` and `Numer` the centred cross
//! moment of row `i` with `r`, both in expanded form. The expansion is kept
//! as written: a two-pass centred computation rounds differently and does not
//! reproduce the reference output. `Slope` is the reciprocal of the usual
//! regression slope of `X[i]` on `r`.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::moving::{movmean, movmean_rows, movsum};
use crate::span::{band_sizes, WindowSpan};
use crate::DEGENERATE_EPS;

/// Moving statistics of the reference that every row shares.
#[derive(Debug, Clone)]
pub struct ReferenceMoments {
    /// Moving mean of `r`.
    pub rmean: Array1<f64>,
    /// Moving sum of `r`.
    pub rsum: Array1<f64>,
    /// Clipped window size per channel, as `f64`.
    pub esum: Array1<f64>,
    /// Windowed sum of squared deviations of `r` from `rmean`.
    pub denom: Array1<f64>,
}

impl ReferenceMoments {
    pub fn new(r: ArrayView1<'_, f64>, half_width: usize) -> Self {
        let n = r.len();
        let rmean = movmean(r, half_width);
        let rsum = movsum(r, half_width);
        let esum: Array1<f64> = band_sizes(n, half_width).into_iter().map(|b| b as f64).collect();

        let denom = Array1::from_shape_fn(n, |j| {
            let span = WindowSpan::new(n, j, half_width);
            let mut sum_r_sq = 0.0;
            for k in span.range() {
                sum_r_sq += r[k] * r[k];
            }
            sum_r_sq - 2.0 * rmean[j] * rsum[j] + rmean[j] * rmean[j] * esum[j]
        });

        Self { rmean, rsum, esum, denom }
    }
}

/// Correct every row of `x` (`[m, n]`) against `r` (length `n`).
///
/// Callers validate shapes; see [`crate::correct`].
pub fn slope_correct(x: ArrayView2<'_, f64>, r: ArrayView1<'_, f64>, half_width: usize) -> Array2<f64> {
    let (m, n) = x.dim();
    debug_assert_eq!(r.len(), n);

    let moments = ReferenceMoments::new(r, half_width);
    let xmean = movmean_rows(x, half_width);

    let mut z = Array2::<f64>::zeros((m, n));
    for i in 0..m {
        for j in 0..n {
            let span = WindowSpan::new(n, j, half_width);
            let numer = cross_moment(x.row(i), r, span, xmean[[i, j]], &moments, j);
            let slope = if numer.abs() < DEGENERATE_EPS {
                0.0
            } else {
                moments.denom[j] / numer
            };
            z[[i, j]] = (x[[i, j]] - xmean[[i, j]]) * slope + moments.rmean[j];
        }
    }
    z
}

/// `Numer[i, j]` for one row, streamed over the window.
#[inline]
fn cross_moment(
    row: ArrayView1<'_, f64>,
    r: ArrayView1<'_, f64>,
    span: WindowSpan,
    xmean: f64,
    moments: &ReferenceMoments,
    j: usize,
) -> f64 {
    let mut sum_xr = 0.0;
    for k in span.range() {
        sum_xr += row[k] * r[k];
    }
    let mut sum_x = 0.0;
    for k in span.range() {
        sum_x += row[k];
    }
    sum_xr - sum_x * moments.rmean[j] - xmean * moments.rsum[j] + xmean * moments.rmean[j] * moments.esum[j]
}
