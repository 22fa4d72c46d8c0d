//! Tile geometry: window counts, stored shapes and index/bounding-box arithmetic.

use crate::{Error, Result, WindowParams};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of windows along each axis of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowGrid {
    /// Windows along the row axis.
    pub n_x: usize,
    /// Windows along the column axis.
    pub n_y: usize,
}

impl WindowGrid {
    /// Computes the grid for a `rows` x `cols` image.
    ///
    /// An axis shorter than the window yields zero windows.
    #[must_use]
    pub fn for_image(rows: usize, cols: usize, params: &WindowParams) -> Self {
        Self {
            n_x: steps(rows, params.window_size_x, params.window_step_x),
            n_y: steps(cols, params.window_size_y, params.window_step_y),
        }
    }

    /// Windows per image.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_x * self.n_y
    }

    /// Returns true if no window fits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top-left pixel of window `(a, b)`.
    #[must_use]
    pub fn origin(a: usize, b: usize, params: &WindowParams) -> (usize, usize) {
        (a * params.window_step_x, b * params.window_step_y)
    }
}

fn steps(dim: usize, size: usize, step: usize) -> usize {
    if step == 0 || dim < size {
        0
    } else {
        (dim - size) / step + 1
    }
}

/// The `orig_shape` attribute stored with window datasets:
/// `(n_images, n_x, n_y, size_x, size_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrigShape {
    /// Images in the stack.
    pub n_images: usize,
    /// Windows along the rows of each image.
    pub n_x: usize,
    /// Windows along the columns of each image.
    pub n_y: usize,
    /// Rows of each stored window.
    pub size_x: usize,
    /// Columns of each stored window.
    pub size_y: usize,
}

impl OrigShape {
    /// Builds the shape from its components.
    #[must_use]
    pub fn new(n_images: usize, grid: WindowGrid, size: (usize, usize)) -> Self {
        Self {
            n_images,
            n_x: grid.n_x,
            n_y: grid.n_y,
            size_x: size.0,
            size_y: size.1,
        }
    }

    /// Parses the five-element attribute.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if the slice does not hold five values.
    pub fn from_slice(values: &[u64]) -> Result<Self> {
        let &[n_images, n_x, n_y, size_x, size_y] = values else {
            return Err(Error::ShapeMismatch {
                expected: vec![5],
                actual: vec![values.len()],
            });
        };
        let conv = |v: u64| {
            usize::try_from(v).map_err(|_| Error::invalid("orig_shape", format!("{v} overflows")))
        };
        Ok(Self {
            n_images: conv(n_images)?,
            n_x: conv(n_x)?,
            n_y: conv(n_y)?,
            size_x: conv(size_x)?,
            size_y: conv(size_y)?,
        })
    }

    /// Attribute representation.
    #[must_use]
    pub fn to_array(&self) -> [u64; 5] {
        [
            self.n_images as u64,
            self.n_x as u64,
            self.n_y as u64,
            self.size_x as u64,
            self.size_y as u64,
        ]
    }

    /// Window grid of a single image.
    #[must_use]
    pub fn grid(&self) -> WindowGrid {
        WindowGrid {
            n_x: self.n_x,
            n_y: self.n_y,
        }
    }

    /// Windows stored per image.
    #[must_use]
    pub fn windows_per_image(&self) -> usize {
        self.n_x * self.n_y
    }

    /// Total windows stored for the stack.
    #[must_use]
    pub fn total_windows(&self) -> usize {
        self.n_images * self.windows_per_image()
    }
}

/// Square region cut from every raw image before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CropRegion {
    /// First row.
    pub row: usize,
    /// First column.
    pub col: usize,
    /// Side length in pixels.
    pub size: usize,
}

impl CropRegion {
    /// Creates a region starting at `(row, col)`.
    #[must_use]
    pub fn new(row: usize, col: usize, size: usize) -> Self {
        Self { row, col, size }
    }

    /// Checks that the region lies inside a `rows` x `cols` image.
    ///
    /// # Errors
    /// Returns [`Error::CropOutOfBounds`] if it does not, or
    /// [`Error::InvalidParameter`] for a zero size.
    pub fn check(&self, rows: usize, cols: usize) -> Result<()> {
        if self.size == 0 {
            return Err(Error::invalid("step", "crop size must be positive"));
        }
        // a saturated end never fits
        let row_end = self.row.saturating_add(self.size);
        let col_end = self.col.saturating_add(self.size);
        if row_end > rows || col_end > cols {
            return Err(Error::CropOutOfBounds {
                row: self.row,
                row_end,
                col: self.col,
                col_end,
                rows,
                cols,
            });
        }
        Ok(())
    }
}

/// Half-open pixel ranges of a tile: rows `x0..x1`, columns `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// First row.
    pub x0: usize,
    /// One past the last row.
    pub x1: usize,
    /// First column.
    pub y0: usize,
    /// One past the last column.
    pub y1: usize,
}

impl BoundingBox {
    /// Height in rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.x1 - self.x0
    }

    /// Width in columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.y1 - self.y0
    }

    /// `[x0, x1, y0, y1]`.
    #[must_use]
    pub fn to_array(&self) -> [usize; 4] {
        [self.x0, self.x1, self.y0, self.y1]
    }

    /// Clamps the box to a `rows` x `cols` image.
    #[must_use]
    pub fn clamp(&self, rows: usize, cols: usize) -> Self {
        Self {
            x0: self.x0.min(rows),
            x1: self.x1.min(rows),
            y0: self.y0.min(cols),
            y1: self.y1.min(cols),
        }
    }
}

/// Flat window index plus the tile's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowLocation {
    /// Row in the flattened `(n_images * n_x * n_y, ...)` window datasets.
    pub index: usize,
    /// Tile extent in the filtered image.
    pub bbox: BoundingBox,
}

/// Maps image `t` and window `(a, b)` to its flat index and bounding box.
///
/// The box is centered on `ceil(size / 2) + a * step` with a half-width of
/// `ceil(size / 2)`, so odd window sizes yield a box one pixel wider than the
/// window.
///
/// # Errors
/// Returns [`Error::IndexOutOfRange`] if `t`, `a` or `b` lies outside `shape`.
pub fn locate_window(
    shape: &OrigShape,
    params: &WindowParams,
    t: usize,
    a: usize,
    b: usize,
) -> Result<WindowLocation> {
    check_index("image", t, shape.n_images)?;
    check_index("window x", a, shape.n_x)?;
    check_index("window y", b, shape.n_y)?;

    let half_x = params.window_size_x.div_ceil(2);
    let half_y = params.window_size_y.div_ceil(2);
    let cx = half_x + a * params.window_step_x;
    let cy = half_y + b * params.window_step_y;

    Ok(WindowLocation {
        index: t * shape.windows_per_image() + a * shape.n_y + b,
        bbox: BoundingBox {
            x0: cx - half_x,
            x1: cx + half_x,
            y0: cy - half_y,
            y1: cy + half_y,
        },
    })
}

fn check_index(axis: &'static str, index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(Error::IndexOutOfRange { axis, index, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_counts() {
        let params = WindowParams::default();
        let grid = WindowGrid::for_image(256, 224, &params);
        assert_eq!(grid, WindowGrid { n_x: 5, n_y: 4 });
        assert_eq!(grid.len(), 20);
    }

    #[test]
    fn test_grid_window_larger_than_image() {
        let params = WindowParams::default();
        let grid = WindowGrid::for_image(100, 300, &params);
        assert_eq!(grid.n_x, 0);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_locate_first_window() {
        let params = WindowParams::default();
        let shape = OrigShape::new(3, WindowGrid { n_x: 5, n_y: 4 }, (128, 128));
        let loc = locate_window(&shape, &params, 0, 0, 0).unwrap();
        assert_eq!(loc.index, 0);
        assert_eq!(loc.bbox.to_array(), [0, 128, 0, 128]);
    }

    #[test]
    fn test_locate_interior_window() {
        let params = WindowParams::default();
        let shape = OrigShape::new(3, WindowGrid { n_x: 5, n_y: 4 }, (128, 128));
        let loc = locate_window(&shape, &params, 2, 3, 1).unwrap();
        assert_eq!(loc.index, 2 * 20 + 3 * 4 + 1);
        assert_eq!(loc.bbox.to_array(), [96, 224, 32, 160]);
        assert_eq!(loc.bbox.height(), 128);
    }

    #[test]
    fn test_locate_rectangular_window() {
        let params = WindowParams {
            window_size_x: 64,
            window_size_y: 32,
            window_step_x: 16,
            window_step_y: 8,
            ..WindowParams::default()
        };
        let shape = OrigShape::new(1, WindowGrid { n_x: 3, n_y: 6 }, (64, 64));
        let loc = locate_window(&shape, &params, 0, 2, 5).unwrap();
        assert_eq!(loc.index, 2 * 6 + 5);
        assert_eq!(loc.bbox.to_array(), [32, 96, 40, 72]);
    }

    #[test]
    fn test_locate_odd_window_widens_box() {
        let params = WindowParams {
            window_size_x: 5,
            window_size_y: 5,
            window_step_x: 1,
            window_step_y: 1,
            ..WindowParams::default()
        };
        let shape = OrigShape::new(1, WindowGrid { n_x: 2, n_y: 2 }, (5, 5));
        let loc = locate_window(&shape, &params, 0, 1, 0).unwrap();
        assert_eq!(loc.bbox.to_array(), [1, 7, 0, 6]);
    }

    #[test]
    fn test_locate_out_of_range() {
        let params = WindowParams::default();
        let shape = OrigShape::new(2, WindowGrid { n_x: 2, n_y: 2 }, (128, 128));
        let err = locate_window(&shape, &params, 2, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::IndexOutOfRange {
                axis: "image",
                index: 2,
                len: 2
            }
        ));
        assert!(locate_window(&shape, &params, 0, 0, 2).is_err());
    }

    #[test]
    fn test_crop_bounds() {
        let crop = CropRegion::new(10, 20, 64);
        assert!(crop.check(74, 84).is_ok());
        assert!(matches!(
            crop.check(73, 100),
            Err(Error::CropOutOfBounds { row_end: 74, .. })
        ));
        assert!(CropRegion::new(0, 0, 0).check(10, 10).is_err());
    }

    #[test]
    fn test_crop_near_usize_max_rejected() {
        assert!(matches!(
            CropRegion::new(usize::MAX, 0, 4).check(64, 64),
            Err(Error::CropOutOfBounds { row_end: usize::MAX, .. })
        ));
        assert!(CropRegion::new(0, usize::MAX - 1, 4).check(64, 64).is_err());
    }

    #[test]
    fn test_orig_shape_attr_roundtrip() {
        let shape = OrigShape::new(4, WindowGrid { n_x: 2, n_y: 3 }, (16, 8));
        let parsed = OrigShape::from_slice(&shape.to_array()).unwrap();
        assert_eq!(parsed, shape);
        assert_eq!(parsed.total_windows(), 24);
        assert!(OrigShape::from_slice(&[1, 2, 3]).is_err());
    }
}
