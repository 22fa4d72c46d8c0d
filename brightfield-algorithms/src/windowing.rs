//! Overlapping image windows and their frequency-domain representation.

use crate::fft::{hamming, Fft2Plan};
use crate::resample::resample_cubic;
use brightfield_core::{
    Error, FftMode, Result, WindowFilter, WindowGrid, WindowMode, WindowParams,
};
use ndarray::{s, Array2, Array4, ArrayView2};
use rayon::prelude::*;

/// Tiles images into overlapping windows and optionally transforms each one.
#[derive(Debug, Clone)]
pub struct ImageWindowing {
    params: WindowParams,
}

impl ImageWindowing {
    /// Creates a windowing operator.
    ///
    /// # Errors
    /// Returns an error if `params` fails validation.
    pub fn new(params: WindowParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The parameters in use.
    #[must_use]
    pub fn params(&self) -> &WindowParams {
        &self.params
    }

    /// Window grid for a `rows` x `cols` image.
    #[must_use]
    pub fn grid(&self, rows: usize, cols: usize) -> WindowGrid {
        WindowGrid::for_image(rows, cols, &self.params)
    }

    /// Size of each output window.
    #[must_use]
    pub fn output_size(&self) -> (usize, usize) {
        self.params.output_size()
    }

    /// Cuts `image` into windows, returning `(n_x, n_y, out_x, out_y)`.
    ///
    /// Window `(a, b)` starts at row `a * window_step_x` and column
    /// `b * window_step_y`. In FFT mode each tile is tapered, transformed,
    /// shifted, reduced to magnitude or phase, center-cropped by the zoom
    /// factor and resampled by the interpolation factor.
    ///
    /// # Errors
    /// Returns [`Error::Empty`] if no window fits inside the image.
    pub fn make_windows(&self, image: ArrayView2<'_, f32>) -> Result<Array4<f32>> {
        let (rows, cols) = image.dim();
        let grid = self.grid(rows, cols);
        if grid.is_empty() {
            return Err(Error::Empty(format!(
                "no {}x{} window fits in a {rows}x{cols} image",
                self.params.window_size_x, self.params.window_size_y
            )));
        }

        let p = &self.params;
        let (out_x, out_y) = self.output_size();
        log::debug!(
            "windowing {rows}x{cols} image into {}x{} windows of {out_x}x{out_y}",
            grid.n_x,
            grid.n_y
        );

        let transform = match p.mode {
            WindowMode::Fft => Some(FftStage::new(p)),
            WindowMode::Image => None,
        };

        let tiles: Vec<Array2<f32>> = (0..grid.len())
            .into_par_iter()
            .map(|k| {
                let (a, b) = (k / grid.n_y, k % grid.n_y);
                let (x0, y0) = WindowGrid::origin(a, b, p);
                let tile = image.slice(s![x0..x0 + p.window_size_x, y0..y0 + p.window_size_y]);
                match &transform {
                    Some(stage) => stage.apply(tile),
                    None => tile.to_owned(),
                }
            })
            .collect();

        let mut windows = Array4::<f32>::zeros((grid.n_x, grid.n_y, out_x, out_y));
        for (k, tile) in tiles.iter().enumerate() {
            windows
                .slice_mut(s![k / grid.n_y, k % grid.n_y, .., ..])
                .assign(tile);
        }
        Ok(windows)
    }
}

struct FftStage {
    taper: Option<Array2<f32>>,
    plan: Fft2Plan,
    fft_mode: FftMode,
    crop: (usize, usize),
    output: (usize, usize),
    resample: bool,
}

impl FftStage {
    #[allow(clippy::cast_possible_truncation)]
    fn new(p: &WindowParams) -> Self {
        let taper = match p.filter {
            WindowFilter::Hamming => {
                let wx = hamming(p.window_size_x);
                let wy = hamming(p.window_size_y);
                Some(Array2::from_shape_fn(
                    (p.window_size_x, p.window_size_y),
                    |(r, c)| (wx[r] * wy[c]) as f32,
                ))
            }
            WindowFilter::None => None,
        };
        Self {
            taper,
            plan: Fft2Plan::new(p.window_size_x, p.window_size_y),
            fft_mode: p.fft_mode,
            crop: p.zoom_crop_size(),
            output: p.fft_output_size(),
            resample: !p.is_unit_interpolation(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn apply(&self, tile: ArrayView2<'_, f32>) -> Array2<f32> {
        let spectrum = match &self.taper {
            Some(taper) => self.plan.forward_shifted((&tile * taper).view()),
            None => self.plan.forward_shifted(tile),
        };
        let reduced = match self.fft_mode {
            FftMode::Abs => spectrum.mapv(|c| c.norm() as f32),
            FftMode::Phase => spectrum.mapv(|c| c.arg() as f32),
        };

        let (rows, cols) = reduced.dim();
        let (crop_x, crop_y) = self.crop;
        let (cx, cy) = (rows / 2 - crop_x / 2, cols / 2 - crop_y / 2);
        let cropped = reduced.slice(s![cx..cx + crop_x, cy..cy + crop_y]);

        if self.resample {
            resample_cubic(cropped, self.output.0, self.output.1)
        } else {
            cropped.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp(rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f32)
    }

    #[test]
    fn test_image_mode_tiles_match_source() {
        let params = WindowParams {
            mode: WindowMode::Image,
            window_size_x: 4,
            window_size_y: 3,
            window_step_x: 2,
            window_step_y: 3,
            ..WindowParams::default()
        };
        let image = ramp(8, 9);
        let windows = ImageWindowing::new(params).unwrap().make_windows(image.view()).unwrap();

        assert_eq!(windows.dim(), (3, 3, 4, 3));
        assert_eq!(windows[[1, 2, 0, 0]], image[[2, 6]]);
        assert_eq!(windows[[2, 1, 3, 2]], image[[7, 5]]);
    }

    #[test]
    fn test_fft_default_shape() {
        let params = WindowParams::default().with_target_size(128);
        let image = Array2::<f32>::from_elem((192, 160), 0.5);
        let windows = ImageWindowing::new(params).unwrap().make_windows(image.view()).unwrap();
        assert_eq!(windows.dim(), (3, 2, 128, 128));
    }

    #[test]
    fn test_fft_without_zoom_or_taper_keeps_dc() {
        let params = WindowParams {
            window_size_x: 8,
            window_size_y: 8,
            window_step_x: 8,
            window_step_y: 8,
            zoom_factor: 1,
            interpol_factor: 1.0,
            filter: WindowFilter::None,
            ..WindowParams::default()
        };
        let image = Array2::<f32>::from_elem((16, 8), 1.0);
        let windows = ImageWindowing::new(params).unwrap().make_windows(image.view()).unwrap();

        assert_eq!(windows.dim(), (2, 1, 8, 8));
        assert_abs_diff_eq!(windows[[1, 0, 4, 4]], 64.0, epsilon = 1e-3);
        assert_abs_diff_eq!(windows[[1, 0, 0, 0]], 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_zoom_crop_centered_on_dc() {
        let params = WindowParams {
            window_size_x: 16,
            window_size_y: 16,
            window_step_x: 16,
            window_step_y: 16,
            zoom_factor: 2,
            interpol_factor: 1.0,
            filter: WindowFilter::None,
            ..WindowParams::default()
        };
        let image = Array2::<f32>::from_elem((16, 16), 1.0);
        let windows = ImageWindowing::new(params).unwrap().make_windows(image.view()).unwrap();

        assert_eq!(windows.dim(), (1, 1, 8, 8));
        assert_abs_diff_eq!(windows[[0, 0, 4, 4]], 256.0, epsilon = 1e-3);
    }

    #[test]
    fn test_phase_mode_bounded() {
        let params = WindowParams {
            fft_mode: FftMode::Phase,
            window_size_x: 8,
            window_size_y: 8,
            window_step_x: 4,
            window_step_y: 4,
            ..WindowParams::default()
        }
        .with_target_size(8);
        let windows = ImageWindowing::new(params)
            .unwrap()
            .make_windows(ramp(16, 16).view())
            .unwrap();
        assert!(windows.iter().all(|v| v.abs() <= 2.0 * std::f32::consts::PI));
    }

    #[test]
    fn test_window_larger_than_image_errors() {
        let windowing = ImageWindowing::new(WindowParams::default()).unwrap();
        let image = Array2::<f32>::zeros((64, 64));
        assert!(matches!(
            windowing.make_windows(image.view()),
            Err(Error::Empty(_))
        ));
    }
}
