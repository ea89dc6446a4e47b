//! Boundary-clipped window spans.
//!
//! The window around channel `j` with half-width `v` is `[j-v, j+v]` clipped
//! to `[0, n-1]`. Edge windows shrink instead of padding or wrapping, so
//! every statistic computed over them uses the clipped count.
use std::ops::RangeInclusive;

/// Inclusive index range `[start, end]` of a clipped window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpan {
    pub start: usize,
    pub end: usize,
}

impl WindowSpan {
    /// Window centred on `center` with half-width `half_width` in a sequence
    /// of length `n`.
    ///
    /// `center` must be `< n`; the span is then never empty.
    #[inline]
    pub fn new(n: usize, center: usize, half_width: usize) -> Self {
        debug_assert!(center < n, "WindowSpan: center {center} out of range for length {n}");
        Self {
            start: center.saturating_sub(half_width),
            end: center.saturating_add(half_width).min(n - 1),
        }
    }

    /// Number of samples in the window (`band_size`).
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    #[inline]
    pub fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Offset of `center` inside the span.
    #[inline]
    pub fn offset_of(&self, center: usize) -> usize {
        center - self.start
    }
}

/// Clipped window size at every index of a length-`n` sequence.
pub fn band_sizes(n: usize, half_width: usize) -> Vec<usize> {
    (0..n).map(|j| WindowSpan::new(n, j, half_width).len()).collect()
}
