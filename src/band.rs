//! Per-band regression correctors.
//!
//! Both correctors cut the clipped band `[start, end]` around each channel
//! `j` out of `X` and `r`, regress each row on the reference inside that band
//! and write one corrected column. Channels share nothing, so each one owns
//! its output column; with the `parallel` feature they run on rayon.
//!
//! - [`band_manual_correct`]: centred single-predictor least squares,
//!   `b = (Xc·rc) / (rc·rc)`, output `rmean + Xc[j] / b`. Constant reference
//!   bands and near-zero slopes fall back to `rmean`.
//! - [`band_lsq_correct`]: ordinary least squares with an intercept through
//!   the normal equations of `Z = [1 | r]`, output `(X[j] − a) / b`.
//!   Nothing is guarded: a singular `ZᵀZ` or a zero slope propagates
//!   `inf`/`NaN` into the output.
use ndarray::{array, s, Array1, Array2, ArrayView1, ArrayView2};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::span::WindowSpan;
use crate::DEGENERATE_EPS;

/// Centred least-squares correction with explicit half-width `v`.
pub fn band_manual_correct(x: ArrayView2<'_, f64>, r: ArrayView1<'_, f64>, half_width: usize) -> Array2<f64> {
    let (m, n) = x.dim();
    debug_assert_eq!(r.len(), n);
    per_channel(m, n, |j| manual_channel(x, r, WindowSpan::new(n, j, half_width), j))
}

/// Least squares with intercept, solved via `(ZᵀZ)⁻¹Zᵀ` per band.
pub fn band_lsq_correct(x: ArrayView2<'_, f64>, r: ArrayView1<'_, f64>, half_width: usize) -> Array2<f64> {
    let (m, n) = x.dim();
    debug_assert_eq!(r.len(), n);
    per_channel(m, n, |j| lsq_channel(x, r, WindowSpan::new(n, j, half_width), j))
}

fn manual_channel(x: ArrayView2<'_, f64>, r: ArrayView1<'_, f64>, span: WindowSpan, j: usize) -> Array1<f64> {
    let m = x.nrows();
    let xband = x.slice(s![.., span.range()]);
    let rband = r.slice(s![span.range()]);
    let size = span.len() as f64;

    let rmean = rband.iter().sum::<f64>() / size;
    let rc = rband.mapv(|v| v - rmean);
    let rc_dot_rc: f64 = rc.iter().map(|v| v * v).sum();

    // Constant reference over the band: nothing to regress against.
    if rc_dot_rc.abs() < DEGENERATE_EPS {
        return Array1::from_elem(m, rmean);
    }

    let j_in_band = span.offset_of(j);
    Array1::from_shape_fn(m, |i| {
        let row = xband.row(i);
        let xmean = row.iter().sum::<f64>() / size;
        let mut dot = 0.0;
        for (&xv, &rv) in row.iter().zip(rc.iter()) {
            dot += (xv - xmean) * rv;
        }
        let b = dot / rc_dot_rc;
        if b.abs() < DEGENERATE_EPS {
            rmean
        } else {
            rmean + (row[j_in_band] - xmean) / b
        }
    })
}

fn lsq_channel(x: ArrayView2<'_, f64>, r: ArrayView1<'_, f64>, span: WindowSpan, j: usize) -> Array1<f64> {
    let xband = x.slice(s![.., span.range()]);
    let rband = r.slice(s![span.range()]);

    let mut design = Array2::<f64>::ones((span.len(), 2));
    design.column_mut(1).assign(&rband);

    let gram = design.t().dot(&design);
    let pinv = invert_2x2(&gram).dot(&design.t()); // [2, band]
    let coef = xband.dot(&pinv.t()); // [m, 2]: intercept, slope

    Array1::from_shape_fn(x.nrows(), |i| (x[[i, j]] - coef[[i, 0]]) / coef[[i, 1]])
}

/// Cofactor inverse of a 2×2 matrix. A zero determinant yields non-finite
/// entries rather than an error.
fn invert_2x2(a: &Array2<f64>) -> Array2<f64> {
    let inv_det = 1.0 / (a[[0, 0]] * a[[1, 1]] - a[[0, 1]] * a[[1, 0]]);
    array![
        [a[[1, 1]] * inv_det, -a[[0, 1]] * inv_det],
        [-a[[1, 0]] * inv_det, a[[0, 0]] * inv_det]
    ]
}

/// Build an `[m, n]` matrix column by column.
fn per_channel<F>(m: usize, n: usize, column: F) -> Array2<f64>
where
    F: Fn(usize) -> Array1<f64> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    let cols: Vec<Array1<f64>> = (0..n).into_par_iter().map(column).collect();
    #[cfg(not(feature = "parallel"))]
    let cols: Vec<Array1<f64>> = (0..n).map(column).collect();

    let mut out = Array2::<f64>::zeros((m, n));
    for (j, col) in cols.iter().enumerate() {
        out.column_mut(j).assign(col);
    }
    out
}
