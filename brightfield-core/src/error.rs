//! Error types for brightfield-core.

use thiserror::Error;

/// Result type alias for brightfield operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for brightfield operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A window or filter parameter is unusable.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Array dimensions do not agree.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// An index lies outside the stored grid.
    #[error("{axis} index {index} out of range (len {len})")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    /// A crop region does not fit inside the source image.
    #[error("crop [{row}..{row_end}, {col}..{col_end}] exceeds image of {rows}x{cols}")]
    CropOutOfBounds {
        row: usize,
        row_end: usize,
        col: usize,
        col_end: usize,
        rows: usize,
        cols: usize,
    },

    /// Input contained nothing to process.
    #[error("empty input: {0}")]
    Empty(String),

    /// Unrecognized enum value in configuration.
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl Error {
    /// Convenience constructor for [`Error::InvalidParameter`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
