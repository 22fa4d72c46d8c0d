//! Cubic resampling of float arrays.

use ndarray::{Array2, ArrayView2, Axis, Zip};

/// Resamples `input` to `(rows, cols)` with separable cubic convolution.
///
/// Corner samples stay aligned: output index `i` reads input coordinate
/// `i * (n_in - 1) / (n_out - 1)`. Samples past the edge repeat the edge.
/// Values are not clamped, so spectra keep their dynamic range.
#[must_use]
pub fn resample_cubic(input: ArrayView2<'_, f32>, rows: usize, cols: usize) -> Array2<f32> {
    if input.dim() == (rows, cols) {
        return input.to_owned();
    }
    if input.is_empty() || rows == 0 || cols == 0 {
        return Array2::zeros((rows, cols));
    }
    let tall = resample_axis(input, rows, Axis(0));
    resample_axis(tall.view(), cols, Axis(1))
}

#[allow(clippy::cast_possible_truncation)]
fn resample_axis(input: ArrayView2<'_, f32>, n_out: usize, axis: Axis) -> Array2<f32> {
    let n_in = input.len_of(axis);
    let mut shape = input.raw_dim();
    shape[axis.index()] = n_out;
    let mut out = Array2::<f32>::zeros(shape);

    let taps: Vec<([usize; 4], [f64; 4])> = (0..n_out).map(|i| taps_for(i, n_in, n_out)).collect();

    Zip::from(input.lanes(axis))
        .and(out.lanes_mut(axis))
        .for_each(|lane_in, mut lane_out| {
            for (dst, (idx, w)) in lane_out.iter_mut().zip(&taps) {
                let acc: f64 = idx
                    .iter()
                    .zip(w)
                    .map(|(&j, &wj)| wj * f64::from(lane_in[j]))
                    .sum();
                *dst = acc as f32;
            }
        });
    out
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
fn taps_for(i: usize, n_in: usize, n_out: usize) -> ([usize; 4], [f64; 4]) {
    let pos = if n_out > 1 {
        i as f64 * (n_in - 1) as f64 / (n_out - 1) as f64
    } else {
        0.0
    };
    let base = pos.floor();
    let frac = pos - base;
    let base = base as isize;
    let last = n_in as isize - 1;

    let mut idx = [0usize; 4];
    let mut w = [0.0; 4];
    for k in 0..4 {
        let offset = k as isize - 1;
        idx[k] = (base + offset).clamp(0, last) as usize;
        w[k] = cubic_weight(frac - offset as f64);
    }
    (idx, w)
}

/// Keys cubic convolution kernel, `a = -0.5`.
fn cubic_weight(x: f64) -> f64 {
    const A: f64 = -0.5;
    let x = x.abs();
    if x <= 1.0 {
        ((A + 2.0) * x - (A + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        ((A * x - 5.0 * A) * x + 8.0 * A) * x - 4.0 * A
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    #[test]
    fn test_weights_partition_unity() {
        for frac in [0.0, 0.25, 0.5, 0.9] {
            let sum: f64 = (-1..3).map(|o| cubic_weight(frac - f64::from(o))).sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(cubic_weight(0.0), 1.0);
        assert_abs_diff_eq!(cubic_weight(1.0), 0.0);
    }

    #[test]
    fn test_linear_ramp_preserved() {
        let input = Array2::from_shape_fn((5, 5), |(r, c)| (r + 2 * c) as f32);
        let out = resample_cubic(input.view(), 9, 9);

        assert_eq!(out.dim(), (9, 9));
        assert_abs_diff_eq!(out[[0, 0]], 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(out[[8, 8]], 12.0, epsilon = 1e-5);
        // interior points are exact for a linear ramp
        assert_abs_diff_eq!(out[[3, 5]], 1.5 + 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_large_values_not_clamped() {
        let input = Array2::<f32>::from_elem((4, 4), 1.0e4);
        let out = resample_cubic(input.view(), 8, 8);
        for &v in &out {
            assert_abs_diff_eq!(v, 1.0e4, epsilon = 1e-1);
        }
    }

    #[test]
    fn test_same_shape_is_copy() {
        let input = Array2::from_shape_fn((3, 2), |(r, c)| (r * c) as f32);
        assert_eq!(resample_cubic(input.view(), 3, 2), input);
    }
}
