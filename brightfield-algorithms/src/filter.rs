//! Separable Gaussian filtering with reflected boundaries.

use ndarray::{Array2, ArrayView2, Axis, Zip};

/// Kernel half-width in units of sigma.
pub const TRUNCATE: f64 = 4.0;

/// Normalized 1-D Gaussian kernel of radius `floor(TRUNCATE * sigma + 0.5)`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as usize;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Blurs `image` with a Gaussian of standard deviation `sigma` pixels.
///
/// Rows and columns are convolved in turn. Out-of-range samples reflect about
/// the edge (`d c b a | a b c d | d c b a`). A non-positive `sigma` returns a
/// copy of the input.
#[must_use]
pub fn gaussian_filter(image: ArrayView2<'_, f32>, sigma: f64) -> Array2<f32> {
    if sigma <= 0.0 || image.is_empty() {
        return image.to_owned();
    }
    let kernel = gaussian_kernel(sigma);
    let rows = convolve_axis(image, &kernel, Axis(0));
    convolve_axis(rows.view(), &kernel, Axis(1))
}

/// `image - gaussian_filter(image, sigma)`: removes slowly varying background.
#[must_use]
pub fn high_pass(image: ArrayView2<'_, f32>, sigma: f64) -> Array2<f32> {
    let blurred = gaussian_filter(image, sigma);
    &image - &blurred
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn convolve_axis(input: ArrayView2<'_, f32>, kernel: &[f64], axis: Axis) -> Array2<f32> {
    let radius = (kernel.len() / 2) as isize;
    let mut out = Array2::<f32>::zeros(input.raw_dim());

    Zip::from(input.lanes(axis))
        .and(out.lanes_mut(axis))
        .for_each(|lane_in, mut lane_out| {
            let n = lane_in.len();
            for (i, dst) in lane_out.iter_mut().enumerate() {
                let centre = i as isize - radius;
                let acc: f64 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, w)| w * f64::from(lane_in[reflect_index(centre + k as isize, n)]))
                    .sum();
                *dst = acc as f32;
            }
        });
    out
}

/// Maps any index onto `0..n` by reflecting about the edges, period `2n`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn reflect_index(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m >= n {
        2 * n - 1 - m
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        let kernel = gaussian_kernel(2.0);
        assert_eq!(kernel.len(), 17);
        assert_abs_diff_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(kernel[0], kernel[16], epsilon = 1e-15);
        assert!(kernel[8] > kernel[7]);
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        // wider than the lane: reflect repeatedly
        assert_eq!(reflect_index(9, 4), 1);
        assert_eq!(reflect_index(-9, 4), 0);
    }

    #[test]
    fn test_constant_image_unchanged() {
        let image = Array2::<f32>::from_elem((12, 9), 0.7);
        let blurred = gaussian_filter(image.view(), 20.0);
        for &v in &blurred {
            assert_abs_diff_eq!(v, 0.7, epsilon = 1e-5);
        }
        let hp = high_pass(image.view(), 20.0);
        for &v in &hp {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_impulse_spreads_symmetrically() {
        let mut image = Array2::<f32>::zeros((21, 21));
        image[[10, 10]] = 1.0;
        let blurred = gaussian_filter(image.view(), 1.5);

        assert_abs_diff_eq!(blurred.sum(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(blurred[[10, 9]], blurred[[10, 11]], epsilon = 1e-7);
        assert_abs_diff_eq!(blurred[[9, 10]], blurred[[10, 9]], epsilon = 1e-7);
        assert!(blurred[[10, 10]] < 1.0);
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let image = Array2::from_shape_fn((3, 4), |(r, c)| (r * 4 + c) as f32);
        assert_eq!(gaussian_filter(image.view(), 0.0), image);
    }
}
