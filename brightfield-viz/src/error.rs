//! Visualization error types.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Result type for figure rendering.
pub type Result<T> = std::result::Result<T, Error>;

/// Visualization error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Dataset or HDF5 error.
    #[error("dataset error: {0}")]
    Dataset(#[from] brightfield_io::Error),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] brightfield_core::Error),

    /// Invalid rendering option.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Drawing backend or layout error.
    #[error("plot error: {0}")]
    Plot(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for Error {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Error::Plot(err.to_string())
    }
}
