//! brightfield-viz: Static figures for bright-field stacks.
//!
//! Renders raw ramp images and the window view (filtered image with the
//! window outlined, its log FFT and the window itself) as plotters heatmaps
//! with colorbars, and optionally saves them through a [`Printer`].
//!

mod colormap;
mod error;
mod figure;
mod panel;
mod viz;

pub use colormap::{Colormap, ValueRange};
pub use error::{Error, Result};
pub use figure::{Printer, ScaleBar, BAR_COLOR, BOX_COLOR};
pub use viz::{Viz, VizOptions, RAW_FIGURE_SIZE, WINDOW_FIGURE_SIZE};
