//! Grayscale conversion.

use image::DynamicImage;
use ndarray::Array2;

const LUMA_R: f32 = 0.2125;
const LUMA_G: f32 = 0.7154;
const LUMA_B: f32 = 0.0721;

/// Converts a decoded image into a `(rows, cols)` luminance array in `[0, 1]`.
///
/// Color images use the CIE luminance weights; any alpha channel is ignored.
/// Single-channel images are only normalized by their bit depth.
#[must_use]
pub fn rgb_to_gray(image: &DynamicImage) -> Array2<f32> {
    let rows = image.height() as usize;
    let cols = image.width() as usize;

    if image.color().has_color() {
        let rgb = image.to_rgb32f();
        let raw = rgb.as_raw();
        Array2::from_shape_fn((rows, cols), |(r, c)| {
            let i = (r * cols + c) * 3;
            LUMA_R * raw[i] + LUMA_G * raw[i + 1] + LUMA_B * raw[i + 2]
        })
    } else {
        let luma = image.to_luma32f();
        let raw = luma.as_raw();
        Array2::from_shape_fn((rows, cols), |(r, c)| raw[r * cols + c])
    }
}
