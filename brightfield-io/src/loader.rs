//! Raw image loading.

use crate::Result;
use brightfield_algorithms::rgb_to_gray;
use image::ImageReader;
use ndarray::Array2;
use std::path::Path;

/// Decodes an image file into a grayscale `(rows, cols)` array in `[0, 1]`.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
    let image = ImageReader::open(path.as_ref())?
        .with_guessed_format()?
        .decode()?;
    Ok(rgb_to_gray(&image))
}
