//! HDF5 file holding the cropped stack, its filtered version and the window datasets.
//!
//! Layout:
//! - `All` `(n_images, size, size)` f32: cropped grayscale images
//! - `All_filtered` `(n_images, size, size)` f32: high-passed, column-scaled images
//! - `<prefix>windows/<prefix>windows_data` `(n_windows, out_x, out_y)` f32
//! - `<prefix>windows/<prefix>windows_logdata` `(n_windows, 1, target, target)` f32

use crate::{Error, Result};
use brightfield_core::{CropRegion, FftMode, OrigShape, WindowFilter, WindowMode, WindowParams};
use hdf5::types::{H5Type, VarLenUnicode};
use hdf5::{Dataset, File, Group, Location};
use ndarray::{s, Array2, ArrayView1};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Cropped grayscale stack.
pub const RAW_DATASET: &str = "All";
/// Filtered stack.
pub const FILTERED_DATASET: &str = "All_filtered";

/// Prefixes of the window group and datasets.
///
/// Each prefix is joined directly to its base name, so `windows_group = "a_"`
/// addresses the group `a_windows`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowNames {
    /// Prefix of the `windows` group.
    pub windows_group: String,
    /// Prefix of the `windows_data` dataset.
    pub dset_name: String,
    /// Prefix of the `windows_logdata` dataset.
    pub logset_name: String,
}

impl WindowNames {
    /// Group holding the window datasets.
    #[must_use]
    pub fn group(&self) -> String {
        format!("{}windows", self.windows_group)
    }

    /// Dataset of raw windows.
    #[must_use]
    pub fn data(&self) -> String {
        format!("{}windows_data", self.dset_name)
    }

    /// Dataset of log-thresholded windows.
    #[must_use]
    pub fn log(&self) -> String {
        format!("{}windows_logdata", self.logset_name)
    }
}

/// Metadata stored with a window dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAttributes {
    /// Stack and grid shape the windows were cut from.
    pub orig_shape: OrigShape,
    /// Parameters that produced the windows.
    pub params: WindowParams,
    /// Log threshold, present on the log dataset only.
    pub filter_threshold: Option<f64>,
}

/// An open preprocessed file.
pub struct PreprocessedFile {
    file: File,
    path: PathBuf,
}

impl PreprocessedFile {
    /// Opens the file read/write, creating it if missing.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::append(&path)?;
        Ok(Self { file, path })
    }

    /// Opens an existing file read-only.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or is not HDF5.
    pub fn open_read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self { file, path })
    }

    /// Location on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces `All` and `All_filtered` with empty `(n_images, size, size)` datasets.
    ///
    /// # Errors
    /// Returns an error if HDF5 I/O fails.
    pub fn create_stack(&self, n_images: usize, crop: CropRegion) -> Result<(Dataset, Dataset)> {
        let shape = vec![n_images, crop.size, crop.size];
        let raw = recreate_dataset_f32(&self.file, RAW_DATASET, &shape)?;
        let filtered = recreate_dataset_f32(&self.file, FILTERED_DATASET, &shape)?;
        for ds in [&raw, &filtered] {
            put_attr_scalar(ds, "crop_row", &to_i64(crop.row))?;
            put_attr_scalar(ds, "crop_col", &to_i64(crop.col))?;
            put_attr_scalar(ds, "crop_size", &to_i64(crop.size))?;
        }
        Ok((raw, filtered))
    }

    /// Shape `(n_images, rows, cols)` of the filtered stack.
    ///
    /// # Errors
    /// Returns [`Error::MissingEntry`] if the stack has not been written.
    pub fn stack_shape(&self) -> Result<(usize, usize, usize)> {
        let ds = self.dataset(FILTERED_DATASET)?;
        let shape = ds.shape();
        match shape.as_slice() {
            &[t, rows, cols] => Ok((t, rows, cols)),
            other => Err(Error::InvalidFormat(format!(
                "{FILTERED_DATASET} must be 3-D, got {other:?}"
            ))),
        }
    }

    /// Image `t` of the filtered stack.
    ///
    /// # Errors
    /// Returns an error if the dataset is missing or `t` is out of range.
    pub fn read_filtered(&self, t: usize) -> Result<Array2<f32>> {
        self.read_plane(FILTERED_DATASET, t)
    }

    /// Image `t` of the cropped, unfiltered stack.
    ///
    /// # Errors
    /// Returns an error if the dataset is missing or `t` is out of range.
    pub fn read_raw(&self, t: usize) -> Result<Array2<f32>> {
        self.read_plane(RAW_DATASET, t)
    }

    /// Opens the window group, creating it if needed.
    ///
    /// # Errors
    /// Returns an error if HDF5 I/O fails.
    pub fn ensure_window_group(&self, names: &WindowNames) -> Result<Group> {
        let name = names.group();
        if self.file.link_exists(&name) {
            Ok(self.file.group(&name)?)
        } else {
            Ok(self.file.create_group(&name)?)
        }
    }

    /// Window `idx` of the raw window dataset.
    ///
    /// # Errors
    /// Returns an error if the dataset is missing or `idx` is out of range.
    pub fn read_window(&self, names: &WindowNames, idx: usize) -> Result<Array2<f32>> {
        let ds = self.window_dataset(names, &names.data())?;
        check_len(&ds, idx)?;
        Ok(ds.read_slice_2d::<f32, _>(s![idx, .., ..])?)
    }

    /// Window `idx` of the log-thresholded dataset.
    ///
    /// # Errors
    /// Returns an error if the dataset is missing or `idx` is out of range.
    pub fn read_log_window(&self, names: &WindowNames, idx: usize) -> Result<Array2<f32>> {
        let ds = self.window_dataset(names, &names.log())?;
        check_len(&ds, idx)?;
        Ok(ds.read_slice_2d::<f32, _>(s![idx, 0, .., ..])?)
    }

    /// Shape and parameters stored with the log-thresholded dataset.
    ///
    /// # Errors
    /// Returns an error if the dataset or a required attribute is missing.
    pub fn read_window_attrs(&self, names: &WindowNames) -> Result<WindowAttributes> {
        let ds = self.window_dataset(names, &names.log())?;
        read_window_attrs(&ds)
    }

    pub(crate) fn dataset(&self, name: &str) -> Result<Dataset> {
        if !self.file.link_exists(name) {
            return Err(self.missing("dataset", name));
        }
        Ok(self.file.dataset(name)?)
    }

    fn window_dataset(&self, names: &WindowNames, name: &str) -> Result<Dataset> {
        let group_name = names.group();
        if !self.file.link_exists(&group_name) {
            return Err(self.missing("group", &group_name));
        }
        let group = self.file.group(&group_name)?;
        if !group.link_exists(name) {
            return Err(self.missing("dataset", &format!("{group_name}/{name}")));
        }
        Ok(group.dataset(name)?)
    }

    fn read_plane(&self, name: &str, t: usize) -> Result<Array2<f32>> {
        let ds = self.dataset(name)?;
        check_len(&ds, t)?;
        Ok(ds.read_slice_2d::<f32, _>(s![t, .., ..])?)
    }

    fn missing(&self, kind: &'static str, name: &str) -> Error {
        Error::MissingEntry {
            kind,
            name: name.to_string(),
            path: self.path.clone(),
        }
    }
}

/// Creates `name` with `shape`, replacing any existing dataset.
pub(crate) fn recreate_dataset_f32(group: &Group, name: &str, shape: &[usize]) -> Result<Dataset> {
    if group.link_exists(name) {
        group.unlink(name)?;
    }
    Ok(group.new_dataset::<f32>().shape(shape.to_vec()).create(name)?)
}

/// Reuses `name` when its shape matches, creates it when absent, and
/// replaces it when `overwrite` is set.
pub(crate) fn ensure_dataset_f32(
    group: &Group,
    name: &str,
    shape: &[usize],
    overwrite: bool,
) -> Result<Dataset> {
    if overwrite || !group.link_exists(name) {
        return recreate_dataset_f32(group, name, shape);
    }
    let ds = group.dataset(name)?;
    let actual = ds.shape();
    if actual != shape {
        return Err(brightfield_core::Error::ShapeMismatch {
            expected: shape.to_vec(),
            actual,
        }
        .into());
    }
    Ok(ds)
}

/// Stores `orig_shape`, every window parameter and, for the log dataset,
/// `filter_threshold`.
pub(crate) fn write_window_attrs(
    ds: &Dataset,
    shape: &OrigShape,
    params: &WindowParams,
    filter_threshold: Option<f64>,
) -> Result<()> {
    let orig = shape
        .to_array()
        .map(|v| i64::try_from(v).unwrap_or(i64::MAX));
    put_attr_array(ds, "orig_shape", &orig)?;
    if let Some(threshold) = filter_threshold {
        put_attr_scalar(ds, "filter_threshold", &threshold)?;
    }
    put_attr_str(ds, "fft_mode", params.fft_mode.as_str())?;
    put_attr_scalar(ds, "interpol_factor", &params.interpol_factor)?;
    put_attr_str(ds, "mode", params.mode.as_str())?;
    put_attr_scalar(ds, "window_size_x", &to_i64(params.window_size_x))?;
    put_attr_scalar(ds, "window_size_y", &to_i64(params.window_size_y))?;
    put_attr_scalar(ds, "window_step_x", &to_i64(params.window_step_x))?;
    put_attr_scalar(ds, "window_step_y", &to_i64(params.window_step_y))?;
    put_attr_scalar(ds, "zoom_factor", &to_i64(params.zoom_factor))?;
    put_attr_str(ds, "filter", params.filter.as_str())?;
    Ok(())
}

fn read_window_attrs(ds: &Dataset) -> Result<WindowAttributes> {
    let orig: Vec<i64> = required_attr(ds, "orig_shape")?.read_raw::<i64>()?;
    let orig: Vec<u64> = orig
        .into_iter()
        .map(|v| {
            u64::try_from(v).map_err(|_| Error::InvalidFormat(format!("negative orig_shape {v}")))
        })
        .collect::<Result<_>>()?;
    let orig_shape = OrigShape::from_slice(&orig)?;

    let defaults = WindowParams::default();
    let params = WindowParams {
        fft_mode: read_attr_str(ds, "fft_mode")?
            .map(|s| FftMode::from_str(&s))
            .transpose()?
            .unwrap_or(defaults.fft_mode),
        interpol_factor: required_attr(ds, "interpol_factor")?.read_scalar::<f64>()?,
        mode: read_attr_str(ds, "mode")?
            .map(|s| WindowMode::from_str(&s))
            .transpose()?
            .unwrap_or(defaults.mode),
        window_size_x: read_attr_usize(ds, "window_size_x")?,
        window_size_y: read_attr_usize(ds, "window_size_y")?,
        window_step_x: read_attr_usize(ds, "window_step_x")?,
        window_step_y: read_attr_usize(ds, "window_step_y")?,
        zoom_factor: read_attr_usize(ds, "zoom_factor")?,
        filter: read_attr_str(ds, "filter")?
            .map(|s| WindowFilter::from_str(&s))
            .transpose()?
            .unwrap_or(defaults.filter),
    };

    let filter_threshold = if has_attr(ds, "filter_threshold")? {
        Some(ds.attr("filter_threshold")?.read_scalar::<f64>()?)
    } else {
        None
    };

    Ok(WindowAttributes {
        orig_shape,
        params,
        filter_threshold,
    })
}

fn check_len(ds: &Dataset, index: usize) -> Result<()> {
    let len = ds.shape().first().copied().unwrap_or(0);
    if index >= len {
        return Err(brightfield_core::Error::IndexOutOfRange {
            axis: "dataset",
            index,
            len,
        }
        .into());
    }
    Ok(())
}

fn has_attr(loc: &Location, name: &str) -> Result<bool> {
    Ok(loc.attr_names()?.iter().any(|n| n == name))
}

fn required_attr(loc: &Location, name: &str) -> Result<hdf5::Attribute> {
    if !has_attr(loc, name)? {
        return Err(Error::InvalidFormat(format!(
            "attribute '{name}' missing on {}",
            loc.name()
        )));
    }
    Ok(loc.attr(name)?)
}

fn read_attr_usize(loc: &Location, name: &str) -> Result<usize> {
    let value = required_attr(loc, name)?.read_scalar::<i64>()?;
    usize::try_from(value)
        .map_err(|_| Error::InvalidFormat(format!("attribute '{name}' = {value} is negative")))
}

fn read_attr_str(loc: &Location, name: &str) -> Result<Option<String>> {
    if !has_attr(loc, name)? {
        return Ok(None);
    }
    let value: VarLenUnicode = loc.attr(name)?.read_scalar()?;
    Ok(Some(value.to_string()))
}

fn put_attr_scalar<T: H5Type>(loc: &Location, name: &str, value: &T) -> Result<()> {
    if has_attr(loc, name)? {
        loc.attr(name)?.write_scalar(value)?;
    } else {
        loc.new_attr::<T>().create(name)?.write_scalar(value)?;
    }
    Ok(())
}

fn put_attr_array(loc: &Location, name: &str, values: &[i64]) -> Result<()> {
    let view = ArrayView1::from(values);
    if has_attr(loc, name)? {
        let attr = loc.attr(name)?;
        if attr.shape() != [values.len()] {
            return Err(Error::InvalidFormat(format!(
                "attribute '{name}' has shape {:?}, expected [{}]",
                attr.shape(),
                values.len()
            )));
        }
        attr.write(view)?;
        return Ok(());
    }
    loc.new_attr::<i64>()
        .shape((values.len(),))
        .create(name)?
        .write(view)?;
    Ok(())
}

fn put_attr_str(loc: &Location, name: &str, value: &str) -> Result<()> {
    let value = VarLenUnicode::from_str(value)
        .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))?;
    put_attr_scalar(loc, name, &value)
}

#[allow(clippy::cast_possible_wrap)]
fn to_i64(value: usize) -> i64 {
    value as i64
}
