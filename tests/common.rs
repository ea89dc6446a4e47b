/// Shared helpers: synthetic spectra with known scatter.
use ndarray::{Array1, Array2};

#[allow(unused)]
/// Smooth positive reference spectrum of length `n` (two Gaussian bands on a
/// sloped baseline).
pub fn reference_spectrum(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |j| {
        let t = j as f64 / n.max(1) as f64;
        0.2 + 0.5 * t
            + 1.5 * (-((t - 0.3) / 0.05).powi(2)).exp()
            + 0.8 * (-((t - 0.7) / 0.08).powi(2)).exp()
    })
}

#[allow(unused)]
/// `m` spectra `X[i] = a_i · r + c_i` with distinct per-row scatter.
pub fn scattered(r: &Array1<f64>, m: usize) -> Array2<f64> {
    Array2::from_shape_fn((m, r.len()), |(i, j)| {
        let a = 0.6 + 0.25 * i as f64;
        let c = 0.1 * (i as f64 - 1.0);
        a * r[j] + c
    })
}

#[allow(unused)]
/// Deterministic small perturbation, independent per cell.
pub fn wobble(m: usize, n: usize, amp: f64) -> Array2<f64> {
    Array2::from_shape_fn((m, n), |(i, j)| amp * ((i * 31 + j * 17) as f64 * 0.37).sin())
}

#[allow(unused)]
/// Maximum absolute difference between two arrays.
pub fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0_f64, f64::max)
}
