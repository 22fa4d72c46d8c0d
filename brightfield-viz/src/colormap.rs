//! Colormap definitions and value normalization.

use crate::Error;
use ndarray::ArrayView2;
use plotters::prelude::*;
use plotters::style::colors::colormaps::ViridisRGB;
use std::fmt;
use std::str::FromStr;

/// Colormaps for figure rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Colormap {
    /// Viridis - dark blue to teal to green to yellow.
    #[default]
    Viridis,
    /// Grayscale - black to white.
    Grayscale,
    /// Hot (Thermal) - red to yellow to white.
    Hot,
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colormap::Viridis => write!(f, "viridis"),
            Colormap::Grayscale => write!(f, "gray"),
            Colormap::Hot => write!(f, "hot"),
        }
    }
}

impl FromStr for Colormap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "viridis" => Ok(Colormap::Viridis),
            "gray" | "grey" | "grayscale" => Ok(Colormap::Grayscale),
            "hot" => Ok(Colormap::Hot),
            other => Err(Error::InvalidOption(format!("unknown colormap '{other}'"))),
        }
    }
}

impl Colormap {
    /// Color of a normalized value in [0, 1]. NaN maps to the bottom.
    #[must_use]
    pub fn apply(self, val: f64) -> RGBColor {
        let val = if val.is_nan() { 0.0 } else { val.clamp(0.0, 1.0) };
        match self {
            Colormap::Viridis => ViridisRGB.get_color(val),
            Colormap::Grayscale => {
                let v = unit_to_u8(val);
                RGBColor(v, v, v)
            }
            Colormap::Hot => {
                if val < 0.5 {
                    RGBColor(255, unit_to_u8(val * 2.0), 0)
                } else {
                    RGBColor(255, 255, unit_to_u8((val - 0.5) * 2.0))
                }
            }
        }
    }
}

/// Finite value range of a map, used for both the heatmap and its colorbar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    /// Smallest finite value.
    pub min: f32,
    /// Largest finite value.
    pub max: f32,
}

impl ValueRange {
    /// Range of the finite values of `data`; `0..0` if there are none.
    #[must_use]
    pub fn of(data: ArrayView2<'_, f32>) -> Self {
        let (min, max) = data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            return Self { min: 0.0, max: 0.0 };
        }
        Self { min, max }
    }

    /// Position of `v` in the range. A constant map sits at the bottom.
    #[must_use]
    pub fn normalize(&self, v: f32) -> f64 {
        let span = f64::from(self.max) - f64::from(self.min);
        if span > 0.0 {
            (f64::from(v) - f64::from(self.min)) / span
        } else {
            0.0
        }
    }

    /// Value at position `frac` of the range.
    #[must_use]
    pub fn value_at(&self, frac: f64) -> f64 {
        f64::from(self.min) + frac * (f64::from(self.max) - f64::from(self.min))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_u8(value: f64) -> u8 {
    (value * 255.0).clamp(0.0, 255.0).round() as u8
}
