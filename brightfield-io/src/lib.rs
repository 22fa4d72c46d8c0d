//! brightfield-io: Dataset discovery and HDF5 output for bright-field stacks.
//!
//! This crate scans temperature-ramp image directories, decodes the raw
//! images and writes the cropped, filtered and windowed stacks to HDF5.
//!

mod dataset;
mod error;
mod loader;
pub mod preprocessed;
pub mod scanner;

pub use dataset::{BrightFieldDataset, WindowWriteOptions, FILTER_SIGMA};
pub use error::{Error, Result};
pub use loader::load_gray;
pub use preprocessed::{PreprocessedFile, WindowAttributes, WindowNames};
pub use scanner::{scan_stack, StackImage};
