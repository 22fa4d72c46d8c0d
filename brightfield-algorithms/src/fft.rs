//! 2-D FFT helpers.

use ndarray::{Array2, ArrayView2};
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Forward 2-D FFT plans for a fixed tile shape.
///
/// Plans are shared across threads; scratch buffers are per call.
pub(crate) struct Fft2Plan {
    rows: usize,
    cols: usize,
    row_fft: Arc<dyn Fft<f64>>,
    col_fft: Arc<dyn Fft<f64>>,
}

impl Fft2Plan {
    pub(crate) fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            rows,
            cols,
            row_fft: planner.plan_fft_forward(cols),
            col_fft: planner.plan_fft_forward(rows),
        }
    }

    /// Transforms `tile` (must match the planned shape) and shifts the zero
    /// frequency to `(rows / 2, cols / 2)`.
    pub(crate) fn forward_shifted(&self, tile: ArrayView2<'_, f32>) -> Array2<Complex64> {
        let (rows, cols) = (self.rows, self.cols);
        debug_assert_eq!(tile.dim(), (rows, cols));

        // row-major: every row at once
        let mut buffer: Vec<Complex64> = tile
            .iter()
            .map(|&v| Complex64::new(f64::from(v), 0.0))
            .collect();
        self.row_fft.process(&mut buffer);

        // column-major: every column at once
        let mut transposed = vec![Complex64::default(); rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                transposed[c * rows + r] = buffer[r * cols + c];
            }
        }
        self.col_fft.process(&mut transposed);

        Array2::from_shape_fn((rows, cols), |(r, c)| {
            let src_r = (r + rows - rows / 2) % rows;
            let src_c = (c + cols - cols / 2) % cols;
            transposed[src_c * rows + src_r]
        })
    }
}

/// 2-D FFT of `tile` with the zero frequency moved to the center.
#[must_use]
pub fn fft2_shifted(tile: ArrayView2<'_, f32>) -> Array2<Complex64> {
    let (rows, cols) = tile.dim();
    if rows == 0 || cols == 0 {
        return Array2::default((rows, cols));
    }
    Fft2Plan::new(rows, cols).forward_shifted(tile)
}

/// Symmetric Hamming window of length `m`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hamming(m: usize) -> Vec<f64> {
    match m {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (m - 1) as f64;
            (0..m)
                .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / denom).cos())
                .collect()
        }
    }
}
