//! Bright-field temperature-ramp dataset.
//!
//! Ties the raw image directory to its preprocessed HDF5 file: cropping and
//! filtering the stack, tiling it into FFT windows, and mapping a stored
//! window back to its place in the filtered image.

use crate::loader::load_gray;
use crate::preprocessed::{ensure_dataset_f32, write_window_attrs, PreprocessedFile, WindowNames};
use crate::scanner::{scan_stack, StackImage, IMAGE_EXTENSION};
use crate::{Error, Result};
use brightfield_algorithms::{
    high_pass, log_threshold, min_max_scale_columns, ImageWindowing, WindowParams,
};
use brightfield_core::{locate_window, CropRegion, ImageLabel, OrigShape, RampState, WindowLocation};
use ndarray::{s, Array2, Axis};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Standard deviation (pixels) of the background removed before scaling.
pub const FILTER_SIGMA: f64 = 20.0;

/// Options for [`BrightFieldDataset::write_windows`].
#[derive(Debug, Clone)]
pub struct WindowWriteOptions {
    /// Sample name selecting the preprocessed file.
    pub name: String,
    /// Group and dataset name prefixes.
    pub names: WindowNames,
    /// Side length of each stored log window.
    pub target_size: usize,
    /// Upper bound applied after `ln(x + 1)`.
    pub filter_threshold: f32,
    /// Recreate the window datasets instead of reusing them.
    pub overwrite: bool,
    /// Tiling parameters; `interpol_factor` is derived from `target_size`.
    pub params: WindowParams,
}

impl Default for WindowWriteOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            names: WindowNames::default(),
            target_size: 128,
            filter_threshold: 5.0,
            overwrite: false,
            params: WindowParams::default(),
        }
    }
}

/// A directory of `Ramp_Up/` and `Ramp_Down/` images plus its preprocessed files.
#[derive(Debug, Clone)]
pub struct BrightFieldDataset {
    root: PathBuf,
    images: Vec<StackImage>,
}

impl BrightFieldDataset {
    /// Scans `root` and orders its images.
    ///
    /// # Errors
    /// Returns an error if either ramp directory is missing or unreadable.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let images = scan_stack(&root)?;
        log::info!("number of images: {}", images.len());
        Ok(Self { root, images })
    }

    /// Images in acquisition order.
    #[must_use]
    pub fn images(&self) -> &[StackImage] {
        &self.images
    }

    /// Number of images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if no image was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Labels (`"Ramp_Up 25"`, ...) in acquisition order.
    #[must_use]
    pub fn labels(&self) -> Vec<ImageLabel> {
        self.images.iter().map(|img| img.label.clone()).collect()
    }

    /// Loads the image labelled `<state> <temperature>` as grayscale.
    ///
    /// Scanned images are found by label whatever the case of their
    /// extension; anything else is looked up as `<root>/<state>/<temperature>.png`.
    ///
    /// # Errors
    /// Returns an error if the file is missing or cannot be decoded.
    pub fn raw_image(&self, state: RampState, temperature: &str) -> Result<Array2<f32>> {
        let scanned = self
            .images
            .iter()
            .find(|img| img.label.state == state && img.label.temperature == temperature);
        match scanned {
            Some(image) => load_gray(&image.path),
            None => load_gray(
                self.root
                    .join(state.dir_name())
                    .join(format!("{temperature}.{IMAGE_EXTENSION}")),
            ),
        }
    }

    /// `<root>/<name>_preprocessed.h5`, or `<root>/preprocessed.h5` for an empty name.
    #[must_use]
    pub fn preprocessed_path(&self, name: &str) -> PathBuf {
        if name.is_empty() {
            self.root.join("preprocessed.h5")
        } else {
            self.root.join(format!("{name}_preprocessed.h5"))
        }
    }

    /// Opens the preprocessed file for `name`, creating it if missing.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or created.
    pub fn open_preprocessed(&self, name: &str) -> Result<PreprocessedFile> {
        PreprocessedFile::open(self.preprocessed_path(name))
    }

    /// Crops every image and writes the `All` and `All_filtered` stacks.
    ///
    /// Existing stacks are replaced. The filtered image is the crop minus its
    /// Gaussian blur (sigma [`FILTER_SIGMA`]), min-max scaled per column.
    ///
    /// # Errors
    /// Returns an error if an image cannot be decoded, the crop does not fit
    /// an image, or HDF5 I/O fails.
    pub fn write_h5(&self, crop: CropRegion, name: &str) -> Result<()> {
        if self.is_empty() {
            return Err(brightfield_core::Error::Empty(format!(
                "no images under {}",
                self.root.display()
            ))
            .into());
        }
        if crop.size == 0 {
            return Err(brightfield_core::Error::invalid("step", "crop size must be positive").into());
        }

        let file = self.open_preprocessed(name)?;
        let (raw_ds, filtered_ds) = file.create_stack(self.len(), crop)?;
        let start = Instant::now();

        for (i, image) in self.images.iter().enumerate() {
            let gray = load_gray(&image.path)?;
            let (rows, cols) = gray.dim();
            crop.check(rows, cols)?;

            let cropped = gray.slice(s![
                crop.row..crop.row + crop.size,
                crop.col..crop.col + crop.size
            ]);
            raw_ds.write_slice(cropped, s![i, .., ..])?;

            let filtered = min_max_scale_columns(high_pass(cropped, FILTER_SIGMA).view());
            filtered_ds.write_slice(filtered.view(), s![i, .., ..])?;

            log::debug!("[{}/{}] {}", i + 1, self.len(), image.label);
        }

        log::info!(
            "wrote {} images to {} in {:.2}s",
            self.len(),
            file.path().display(),
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Tiles every filtered image into windows and stores them with a
    /// log-thresholded copy.
    ///
    /// Returns the windowing operator that produced the data.
    ///
    /// # Errors
    /// Returns an error if the filtered stack is missing or does not match the
    /// dataset, the parameters are invalid, existing datasets have another
    /// shape (without `overwrite`), or HDF5 I/O fails.
    pub fn write_windows(&self, options: &WindowWriteOptions) -> Result<ImageWindowing> {
        let params = options.params.clone().with_target_size(options.target_size);
        let windowing = ImageWindowing::new(params)?;
        let target = options.target_size;
        let (out_x, out_y) = windowing.output_size();
        if (out_x, out_y) != (target, target) {
            return Err(brightfield_core::Error::ShapeMismatch {
                expected: vec![target, target],
                actual: vec![out_x, out_y],
            }
            .into());
        }

        let file = self.open_preprocessed(&options.name)?;
        let (n_images, rows, cols) = file.stack_shape()?;
        if n_images != self.len() {
            return Err(Error::InvalidFormat(format!(
                "{} holds {n_images} images but the dataset has {}; rerun write_h5",
                file.path().display(),
                self.len()
            )));
        }

        let grid = windowing.grid(rows, cols);
        let per_image = grid.len();
        if per_image == 0 {
            return Err(brightfield_core::Error::Empty(format!(
                "no window fits in the {rows}x{cols} filtered images"
            ))
            .into());
        }
        let total = n_images * per_image;

        let group = file.ensure_window_group(&options.names)?;
        let data_ds = ensure_dataset_f32(
            &group,
            &options.names.data(),
            &[total, out_x, out_y],
            options.overwrite,
        )?;
        let log_ds = ensure_dataset_f32(
            &group,
            &options.names.log(),
            &[total, 1, target, target],
            options.overwrite,
        )?;

        let start = Instant::now();
        for (i, image) in self.images.iter().enumerate() {
            let filtered = file.read_filtered(i)?;
            let windows = windowing.make_windows(filtered.view())?;
            let flat = windows
                .into_shape_with_order((per_image, out_x, out_y))
                .map_err(|e| Error::InvalidFormat(format!("window reshape failed: {e}")))?;

            let rows_out = i * per_image..(i + 1) * per_image;
            data_ds.write_slice(flat.view(), s![rows_out.clone(), .., ..])?;

            let logged = flat.mapv(|v| log_threshold(v, options.filter_threshold));
            log_ds.write_slice(logged.view().insert_axis(Axis(1)), s![rows_out, .., .., ..])?;

            log::debug!("[{}/{}] {} windows for {}", i + 1, n_images, per_image, image.label);
        }

        let params = windowing.params();
        log::info!(
            "shape: {} {} {} {} ({:.2}s)",
            grid.n_x,
            grid.n_y,
            target,
            target,
            start.elapsed().as_secs_f64()
        );
        log::debug!("{params:?}");

        write_window_attrs(
            &data_ds,
            &OrigShape::new(n_images, grid, (out_x, out_y)),
            params,
            None,
        )?;
        write_window_attrs(
            &log_ds,
            &OrigShape::new(n_images, grid, (target, target)),
            params,
            Some(f64::from(options.filter_threshold)),
        )?;

        Ok(windowing)
    }

    /// Index into the window datasets and bounding box in the filtered image
    /// of window `(a, b)` of image `t`.
    ///
    /// # Errors
    /// Returns an error if the windows have not been written or an index is
    /// out of range.
    pub fn window_location(
        &self,
        t: usize,
        a: usize,
        b: usize,
        name: &str,
        names: &WindowNames,
    ) -> Result<WindowLocation> {
        let file = self.open_preprocessed(name)?;
        let attrs = file.read_window_attrs(names)?;
        Ok(locate_window(&attrs.orig_shape, &attrs.params, t, a, b)?)
    }
}
