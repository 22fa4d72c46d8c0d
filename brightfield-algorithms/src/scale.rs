//! Intensity scaling.

use ndarray::{Array2, ArrayBase, ArrayView2, Axis, DataMut, Dimension, Zip};

/// Maps every column independently onto `[0, 1]`.
///
/// Constant columns map to zero.
#[must_use]
pub fn min_max_scale_columns(image: ArrayView2<'_, f32>) -> Array2<f32> {
    let mut out = image.to_owned();
    Zip::from(out.lanes_mut(Axis(0))).for_each(|mut column| {
        let (min, max) = column
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        let scale = if range > 0.0 { 1.0 / range } else { 1.0 };
        column.mapv_inplace(|v| (v - min) * scale);
    });
    out
}

/// `min(ln(value + 1), threshold)`.
#[inline]
#[must_use]
pub fn log_threshold(value: f32, threshold: f32) -> f32 {
    let v = value.ln_1p();
    if v > threshold {
        threshold
    } else {
        v
    }
}

/// Applies [`log_threshold`] to every element.
pub fn log_threshold_inplace<S, D>(data: &mut ArrayBase<S, D>, threshold: f32)
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    data.mapv_inplace(|v| log_threshold(v, threshold));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_columns_scaled_independently() {
        let image = array![[0.0_f32, 10.0, 5.0], [2.0, 20.0, 5.0], [4.0, 15.0, 5.0]];
        let scaled = min_max_scale_columns(image.view());

        assert_abs_diff_eq!(scaled[[0, 0]], 0.0);
        assert_abs_diff_eq!(scaled[[1, 0]], 0.5);
        assert_abs_diff_eq!(scaled[[2, 0]], 1.0);
        assert_abs_diff_eq!(scaled[[2, 1]], 0.5);
        assert_abs_diff_eq!(scaled[[1, 1]], 1.0);
        // constant column
        for r in 0..3 {
            assert_abs_diff_eq!(scaled[[r, 2]], 0.0);
        }
    }

    #[test]
    fn test_log_threshold_clamps() {
        assert_abs_diff_eq!(log_threshold(0.0, 5.0), 0.0);
        assert_abs_diff_eq!(log_threshold(std::f32::consts::E - 1.0, 5.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(log_threshold(1.0e6, 5.0), 5.0);
    }

    #[test]
    fn test_log_threshold_inplace() {
        let mut data = array![[0.0_f32, 1.0e9], [1.0, 3.0]];
        log_threshold_inplace(&mut data, 2.0);
        assert_abs_diff_eq!(data[[0, 1]], 2.0);
        assert_abs_diff_eq!(data[[1, 0]], 2.0_f32.ln(), epsilon = 1e-6);
        assert_abs_diff_eq!(data[[1, 1]], 4.0_f32.ln(), epsilon = 1e-6);
    }
}
