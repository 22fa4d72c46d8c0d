//! I/O error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// HDF5 library error.
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// A required ramp directory is absent.
    #[error("missing directory: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// A required dataset or group has not been written yet.
    #[error("missing {kind} '{name}' in {}", path.display())]
    MissingEntry {
        kind: &'static str,
        name: String,
        path: PathBuf,
    },

    /// Invalid file content.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] brightfield_core::Error),
}
