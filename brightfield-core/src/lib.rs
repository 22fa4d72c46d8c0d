//! brightfield-core: Core types for bright-field image stack preprocessing.
//!
//! This crate provides the shared vocabulary of the pipeline: ramp states and
//! image labels, window parameters, and the tile geometry that maps a window
//! index back to its location in the filtered image.
//!

pub mod error;
pub mod geometry;
pub mod ramp;
pub mod window;

pub use error::{Error, Result};
pub use geometry::{locate_window, BoundingBox, CropRegion, OrigShape, WindowGrid, WindowLocation};
pub use ramp::{ImageLabel, RampState};
pub use window::{FftMode, WindowFilter, WindowMode, WindowParams};
