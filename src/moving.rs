//! Moving sum, mean and sample standard deviation over clipped windows.
//!
//! Every value is recomputed from its own window (no running-sum recurrence),
//! so results are a pure function of `(input, half_width)` and independent of
//! neighbouring positions.
//!
//! 1-D forms take an `ArrayView1`; the `_rows` forms apply the same operation
//! independently to each row of an `[m, n]` matrix.
//!
//! `movstd` returns `NaN` where the window holds a single sample: there is no
//! sample variance from one point, and `NaN` keeps that case distinct from a
//! computed zero.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};

use crate::span::WindowSpan;

/// Moving sum with half-width `half_width`.
pub fn movsum(seq: ArrayView1<'_, f64>, half_width: usize) -> Array1<f64> {
    let n = seq.len();
    Array1::from_shape_fn(n, |j| window_sum(&seq, WindowSpan::new(n, j, half_width)))
}

/// Moving mean: `movsum / band_size`.
pub fn movmean(seq: ArrayView1<'_, f64>, half_width: usize) -> Array1<f64> {
    let n = seq.len();
    Array1::from_shape_fn(n, |j| {
        let span = WindowSpan::new(n, j, half_width);
        window_sum(&seq, span) / span.len() as f64
    })
}

/// Moving sample standard deviation (divisor `count - 1`).
///
/// Positions whose clipped window has one sample are `NaN`.
pub fn movstd(seq: ArrayView1<'_, f64>, half_width: usize) -> Array1<f64> {
    let n = seq.len();
    let mean = movmean(seq, half_width);
    Array1::from_shape_fn(n, |j| {
        let span = WindowSpan::new(n, j, half_width);
        let count = span.len();
        if count <= 1 {
            return f64::NAN;
        }
        let ss: f64 = span
            .range()
            .map(|k| {
                let d = seq[k] - mean[j];
                d * d
            })
            .sum();
        (ss / (count - 1) as f64).sqrt()
    })
}

/// Row-wise [`movsum`] of an `[m, n]` matrix.
pub fn movsum_rows(x: ArrayView2<'_, f64>, half_width: usize) -> Array2<f64> {
    map_rows(x, |row| movsum(row, half_width))
}

/// Row-wise [`movmean`] of an `[m, n]` matrix.
pub fn movmean_rows(x: ArrayView2<'_, f64>, half_width: usize) -> Array2<f64> {
    map_rows(x, |row| movmean(row, half_width))
}

/// Row-wise [`movstd`] of an `[m, n]` matrix.
pub fn movstd_rows(x: ArrayView2<'_, f64>, half_width: usize) -> Array2<f64> {
    map_rows(x, |row| movstd(row, half_width))
}

// ── Helpers ──────────────────────────────────────────────────────────────────

#[inline]
fn window_sum(seq: &ArrayView1<'_, f64>, span: WindowSpan) -> f64 {
    let mut sum = 0.0;
    for k in span.range() {
        sum += seq[k];
    }
    sum
}

fn map_rows<F>(x: ArrayView2<'_, f64>, f: F) -> Array2<f64>
where
    F: Fn(ArrayView1<'_, f64>) -> Array1<f64>,
{
    let mut out = Array2::<f64>::zeros(x.dim());
    Zip::from(out.rows_mut())
        .and(x.rows())
        .for_each(|mut dst, src| dst.assign(&f(src)));
    out
}
