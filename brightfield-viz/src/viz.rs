//! Raw image and window figures for a [`BrightFieldDataset`].

use crate::colormap::Colormap;
use crate::figure::{Printer, ScaleBar};
use crate::panel::{render, Panel};
use crate::Result;
use brightfield_core::RampState;
use brightfield_io::{BrightFieldDataset, WindowNames};
use image::RgbImage;
use ndarray::s;

/// Size in pixels of the raw image figure.
pub const RAW_FIGURE_SIZE: (u32, u32) = (640, 560);

/// Size in pixels of the window figure.
pub const WINDOW_FIGURE_SIZE: (u32, u32) = (1200, 800);

/// Rendering options shared by every figure.
#[derive(Debug, Clone, Default)]
pub struct VizOptions {
    /// Colormap for every panel.
    pub color_map: Colormap,
    /// Saves each figure when set.
    pub printer: Option<Printer>,
    /// Scale bar drawn on full-image panels when set.
    pub scalebar: Option<ScaleBar>,
}

/// Figure builder bound to one dataset.
pub struct Viz<'a> {
    dataset: &'a BrightFieldDataset,
    options: VizOptions,
}

impl<'a> Viz<'a> {
    /// Creates a figure builder.
    #[must_use]
    pub fn new(dataset: &'a BrightFieldDataset, options: VizOptions) -> Self {
        Self { dataset, options }
    }

    /// The options in use.
    #[must_use]
    pub fn options(&self) -> &VizOptions {
        &self.options
    }

    /// Renders the raw image `<state>/<temperature>.png` as a heatmap with a
    /// colorbar and the optional scale bar.
    ///
    /// # Errors
    /// Returns an error if the image cannot be loaded, drawing fails, or the
    /// figure cannot be saved.
    pub fn view_raw(&self, state: RampState, temperature: &str) -> Result<RgbImage> {
        let raw = self.dataset.raw_image(state, temperature)?;
        let title = format!("{state} {temperature}");
        let figure = render(RAW_FIGURE_SIZE, |root| {
            Panel {
                title: &title,
                data: raw.view(),
                colormap: self.options.color_map,
                bbox: None,
                scalebar: self.options.scalebar.as_ref(),
            }
            .draw(root)
        })?;
        self.print(&figure, &format!("{state}_{temperature}_raw"))?;
        Ok(figure)
    }

    /// Renders window `(x, y)` of image `t`.
    ///
    /// The left two thirds show the filtered image with the window outlined
    /// ("Full Image"), the right third the log FFT of the window ("FFT
    /// tile") above the filtered window itself ("Image tile").
    ///
    /// # Errors
    /// Returns an error if the windows have not been written, an index is out
    /// of range, drawing fails, or the figure cannot be saved.
    pub fn view_window(
        &self,
        t: usize,
        x: usize,
        y: usize,
        name: &str,
        names: &WindowNames,
    ) -> Result<RgbImage> {
        let location = self.dataset.window_location(t, x, y, name, names)?;
        let file = self.dataset.open_preprocessed(name)?;
        let filtered = file.read_filtered(t)?;
        let log_window = file.read_log_window(names, location.index)?;
        drop(file);

        let (rows, cols) = filtered.dim();
        let bbox = location.bbox.clamp(rows, cols);
        let tile = filtered.slice(s![bbox.x0..bbox.x1, bbox.y0..bbox.y1]);
        log::debug!(
            "window {} of image {t}: rows {}..{}, cols {}..{}",
            location.index,
            bbox.x0,
            bbox.x1,
            bbox.y0,
            bbox.y1
        );

        let colormap = self.options.color_map;
        let figure = render(WINDOW_FIGURE_SIZE, |root| {
            let (full_area, tiles_area) = root.split_horizontally(WINDOW_FIGURE_SIZE.0 * 2 / 3);
            let tiles = tiles_area.split_evenly((2, 1));

            Panel {
                title: "Full Image",
                data: filtered.view(),
                colormap,
                bbox: Some(bbox),
                scalebar: self.options.scalebar.as_ref(),
            }
            .draw(&full_area)?;
            Panel {
                title: "FFT tile",
                data: log_window.view(),
                colormap,
                bbox: None,
                scalebar: None,
            }
            .draw(&tiles[0])?;
            Panel {
                title: "Image tile",
                data: tile,
                colormap,
                bbox: None,
                scalebar: None,
            }
            .draw(&tiles[1])
        })?;

        self.print(&figure, &format!("{name}_{t}_{x}_{y}_window"))?;
        Ok(figure)
    }

    fn print(&self, figure: &RgbImage, name: &str) -> Result<()> {
        if let Some(printer) = &self.options.printer {
            printer.save(figure, name)?;
        }
        Ok(())
    }
}
