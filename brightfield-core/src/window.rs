//! Window parameters for tiling filtered images.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What each window holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WindowMode {
    /// Frequency-domain representation of the tile.
    #[default]
    Fft,
    /// The tile pixels unchanged.
    Image,
}

/// Reduction applied to the complex spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FftMode {
    /// Magnitude.
    #[default]
    Abs,
    /// Argument in radians.
    Phase,
}

/// Taper applied to a tile before the FFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WindowFilter {
    /// Outer product of two Hamming windows.
    #[default]
    Hamming,
    /// No taper.
    None,
}

macro_rules! str_enum {
    ($ty:ty, $kind:literal, { $($variant:path => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Name used in configuration files and HDF5 attributes.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    _ => Err(Error::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

str_enum!(WindowMode, "window mode", { WindowMode::Fft => "fft", WindowMode::Image => "image" });
str_enum!(FftMode, "fft mode", { FftMode::Abs => "abs", FftMode::Phase => "phase" });
str_enum!(WindowFilter, "window filter", { WindowFilter::Hamming => "hamming", WindowFilter::None => "none" });

/// Parameters controlling how a filtered image is tiled and transformed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowParams {
    /// Reduction applied to the spectrum.
    pub fft_mode: FftMode,
    /// Resampling factor applied after the zoom crop.
    pub interpol_factor: f64,
    /// FFT or raw tiles.
    pub mode: WindowMode,
    /// Window height (rows).
    pub window_size_x: usize,
    /// Window width (columns).
    pub window_size_y: usize,
    /// Row stride between windows.
    pub window_step_x: usize,
    /// Column stride between windows.
    pub window_step_y: usize,
    /// Central fraction of the spectrum kept (1/zoom per axis).
    pub zoom_factor: usize,
    /// Taper applied before the FFT.
    pub filter: WindowFilter,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            fft_mode: FftMode::Abs,
            interpol_factor: 2.0,
            mode: WindowMode::Fft,
            window_size_x: 128,
            window_size_y: 128,
            window_step_x: 32,
            window_step_y: 32,
            zoom_factor: 2,
            filter: WindowFilter::Hamming,
        }
    }
}

impl WindowParams {
    /// Checks that every parameter is usable.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.window_size_x == 0 {
            return Err(Error::invalid("window_size_x", "must be positive"));
        }
        if self.window_size_y == 0 {
            return Err(Error::invalid("window_size_y", "must be positive"));
        }
        if self.window_step_x == 0 {
            return Err(Error::invalid("window_step_x", "must be positive"));
        }
        if self.window_step_y == 0 {
            return Err(Error::invalid("window_step_y", "must be positive"));
        }
        if self.zoom_factor == 0 {
            return Err(Error::invalid("zoom_factor", "must be positive"));
        }
        if !self.interpol_factor.is_finite() || self.interpol_factor <= 0.0 {
            return Err(Error::invalid(
                "interpol_factor",
                format!("must be finite and positive, got {}", self.interpol_factor),
            ));
        }
        if self.mode == WindowMode::Fft && self.zoom_factor > 1 {
            let min = 2 * self.zoom_factor;
            if self.window_size_x < min || self.window_size_y < min {
                return Err(Error::invalid(
                    "zoom_factor",
                    format!(
                        "zoom {} leaves no spectrum in a {}x{} window",
                        self.zoom_factor, self.window_size_x, self.window_size_y
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Sets the interpolation factor so FFT windows come out `target` pixels wide.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn with_target_size(mut self, target: usize) -> Self {
        self.interpol_factor =
            target as f64 / self.window_size_x as f64 * self.zoom_factor as f64;
        self
    }

    /// Size of the centered spectrum crop, before interpolation.
    #[must_use]
    pub fn zoom_crop_size(&self) -> (usize, usize) {
        if self.zoom_factor <= 1 {
            return (self.window_size_x, self.window_size_y);
        }
        let half_x = self.window_size_x / (2 * self.zoom_factor);
        let half_y = self.window_size_y / (2 * self.zoom_factor);
        (2 * half_x, 2 * half_y)
    }

    /// Whether resampling is a no-op.
    #[must_use]
    pub fn is_unit_interpolation(&self) -> bool {
        (self.interpol_factor - 1.0).abs() < 1e-9
    }

    /// Size of one FFT window after cropping and interpolation.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn fft_output_size(&self) -> (usize, usize) {
        let (crop_x, crop_y) = self.zoom_crop_size();
        if self.is_unit_interpolation() {
            return (crop_x, crop_y);
        }
        (
            (crop_x as f64 * self.interpol_factor).round() as usize,
            (crop_y as f64 * self.interpol_factor).round() as usize,
        )
    }

    /// Size of one output window for the configured mode.
    #[must_use]
    pub fn output_size(&self) -> (usize, usize) {
        match self.mode {
            WindowMode::Fft => self.fft_output_size(),
            WindowMode::Image => (self.window_size_x, self.window_size_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_output_is_target() {
        let params = WindowParams::default().with_target_size(128);
        assert_relative_eq!(params.interpol_factor, 2.0);
        assert_eq!(params.zoom_crop_size(), (64, 64));
        assert_eq!(params.fft_output_size(), (128, 128));
    }

    #[test]
    fn test_target_size_smaller_than_window() {
        let params = WindowParams {
            window_size_x: 64,
            window_size_y: 64,
            ..WindowParams::default()
        }
        .with_target_size(32);
        assert_relative_eq!(params.interpol_factor, 1.0);
        assert!(params.is_unit_interpolation());
        assert_eq!(params.fft_output_size(), (32, 32));
    }

    #[test]
    fn test_image_mode_keeps_window_size() {
        let params = WindowParams {
            mode: WindowMode::Image,
            window_size_x: 48,
            window_size_y: 40,
            ..WindowParams::default()
        };
        assert_eq!(params.output_size(), (48, 40));
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let params = WindowParams {
            window_step_y: 0,
            ..WindowParams::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("window_step_y"));
    }

    #[test]
    fn test_validate_rejects_excessive_zoom() {
        let params = WindowParams {
            window_size_x: 8,
            window_size_y: 8,
            zoom_factor: 8,
            ..WindowParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_enum_names_roundtrip() {
        for mode in [FftMode::Abs, FftMode::Phase] {
            assert_eq!(mode.as_str().parse::<FftMode>().unwrap(), mode);
        }
        assert_eq!("FFT".parse::<WindowMode>().unwrap(), WindowMode::Fft);
        assert!("complex".parse::<FftMode>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_params_from_partial_json() {
        let params: WindowParams =
            serde_json::from_str(r#"{"window_step_x": 16, "fft_mode": "phase"}"#).unwrap();
        assert_eq!(params.window_step_x, 16);
        assert_eq!(params.fft_mode, FftMode::Phase);
        assert_eq!(params.window_size_x, 128);
    }
}
