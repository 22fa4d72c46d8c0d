//! brightfield-algorithms: Image processing for bright-field stacks.
//!
//! This crate provides the numerical stages of the pipeline:
//! - **Grayscale** - luminance conversion of decoded images
//! - **Filtering** - separable Gaussian blur and high-pass subtraction
//! - **Scaling** - per-column min-max scaling and log thresholding
//! - **Windowing** - overlapping tiles and their shifted 2-D FFTs
//!
#![warn(missing_docs)]

mod fft;
mod filter;
mod gray;
mod resample;
mod scale;
mod windowing;

pub use fft::{fft2_shifted, hamming};
pub use filter::{gaussian_filter, gaussian_kernel, high_pass, TRUNCATE};
pub use gray::rgb_to_gray;
pub use resample::resample_cubic;
pub use scale::{log_threshold, log_threshold_inplace, min_max_scale_columns};
pub use windowing::ImageWindowing;

// Re-export core window types
pub use brightfield_core::{FftMode, WindowFilter, WindowGrid, WindowMode, WindowParams};
