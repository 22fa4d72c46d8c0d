//! Figure decorations and output.

use crate::{Error, Result};
use image::{ImageFormat, RgbImage};
use plotters::style::{RGBColor, RED, WHITE};
use std::path::{Path, PathBuf};

/// Outline color of window bounding boxes.
pub const BOX_COLOR: RGBColor = RED;

/// Fill and label color of the scale bar.
pub const BAR_COLOR: RGBColor = WHITE;

/// Labeled physical scale bar drawn in the lower-right corner of a map.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    /// Physical width of the full image.
    pub width: f64,
    /// Physical length represented by the bar.
    pub scale_length: f64,
    /// Unit label of `width` and `scale_length`.
    pub units: String,
}

impl ScaleBar {
    /// Creates a scale bar.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOption`] unless both lengths are positive and
    /// the bar is no longer than the image.
    pub fn new(width: f64, scale_length: f64, units: impl Into<String>) -> Result<Self> {
        if !(width > 0.0 && scale_length > 0.0 && scale_length <= width) {
            return Err(Error::InvalidOption(format!(
                "scale bar of {scale_length} on an image {width} wide"
            )));
        }
        Ok(Self {
            width,
            scale_length,
            units: units.into(),
        })
    }

    /// Bar length in pixels for an image `image_width` pixels wide.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_length(&self, image_width: u32) -> u32 {
        let px = (self.scale_length / self.width * f64::from(image_width)).round();
        if px.is_finite() && px > 0.0 {
            (px as u32).min(image_width)
        } else {
            0
        }
    }

    /// Text drawn above the bar, e.g. `"100 nm"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.scale_length, self.units)
    }
}

/// Saves figures under a base directory in one or more formats.
#[derive(Debug, Clone, PartialEq)]
pub struct Printer {
    /// Output directory, created on first save.
    pub basepath: PathBuf,
    /// Formats written for each figure.
    pub formats: Vec<ImageFormat>,
}

impl Printer {
    /// PNG printer writing to `basepath`.
    pub fn new<P: AsRef<Path>>(basepath: P) -> Self {
        Self {
            basepath: basepath.as_ref().to_path_buf(),
            formats: vec![ImageFormat::Png],
        }
    }

    /// Writes `figure` as `<basepath>/<name>.<ext>` for every format.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or encoding fails.
    pub fn save(&self, figure: &RgbImage, name: &str) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.basepath)?;

        let mut written = Vec::with_capacity(self.formats.len());
        for &format in &self.formats {
            let ext = format.extensions_str().first().ok_or_else(|| {
                Error::InvalidOption(format!("no file extension for {format:?}"))
            })?;
            let path = self.basepath.join(format!("{name}.{ext}"));
            figure.save_with_format(&path, format)?;
            log::info!("saved {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    #[test]
    fn test_scale_bar_length() {
        let bar = ScaleBar::new(500.0, 100.0, "nm").unwrap();
        assert_eq!(bar.pixel_length(250), 50);
        assert_eq!(bar.label(), "100 nm");
        assert!(ScaleBar::new(100.0, 200.0, "nm").is_err());
        assert!(ScaleBar::new(0.0, 1.0, "nm").is_err());
    }

    #[test]
    fn test_scale_bar_label_keeps_fraction() {
        let bar = ScaleBar::new(1200.0, 2.5, "um").unwrap();
        assert_eq!(bar.label(), "2.5 um");
        assert_eq!(bar.pixel_length(10), 0);
    }

    #[test]
    fn test_printer_writes_each_format() {
        let dir = TempDir::new().unwrap();
        let printer = Printer {
            basepath: dir.path().join("figures"),
            formats: vec![ImageFormat::Png, ImageFormat::Bmp],
        };
        let figure = RgbImage::from_pixel(8, 4, Rgb([10, 20, 30]));
        let paths = printer.save(&figure, "Ramp_Up_25_raw").unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("figures/Ramp_Up_25_raw.png"));
        assert!(paths.iter().all(|p| p.exists()));
    }
}
