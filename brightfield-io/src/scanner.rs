//! Ramp directory scanner.
//!
//! Discovers the images of a temperature-ramp acquisition and puts them in the
//! order they were taken: heating images by rising temperature, then cooling
//! images by falling temperature.

use crate::{Error, Result};
use brightfield_core::{ImageLabel, RampState};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// File extension of raw images.
pub const IMAGE_EXTENSION: &str = "png";

/// One image of the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackImage {
    /// Ramp and temperature of the image.
    pub label: ImageLabel,
    /// Location on disk.
    pub path: PathBuf,
}

/// Sort key of a raw image file name.
///
/// Names shorter than eight characters are treated as `<temperature>.png` and
/// keyed by the zero-padded temperature; longer names share the key `-0.png`,
/// which sorts ahead of every padded temperature.
#[must_use]
pub fn ramp_sort_key(file_name: &str) -> String {
    let chars: Vec<char> = file_name.chars().collect();
    if chars.len() < 8 {
        let stem: String = chars[..chars.len().saturating_sub(4)].iter().collect();
        format!("-{}", zfill(&stem, 3))
    } else {
        "-0.png".to_string()
    }
}

/// Left-pads with zeros to `width` characters, keeping a leading sign in front.
fn zfill(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let pad = "0".repeat(width - len);
    match s.chars().next() {
        Some(sign @ ('+' | '-')) => format!("{sign}{pad}{}", &s[1..]),
        _ => format!("{pad}{s}"),
    }
}

/// Lists the raw images of one ramp in acquisition order.
///
/// # Errors
/// Returns [`Error::MissingDirectory`] if the ramp directory does not exist,
/// or an I/O error if it cannot be read.
pub fn scan_ramp(root: &Path, state: RampState) -> Result<Vec<StackImage>> {
    let dir = root.join(state.dir_name());
    if !dir.is_dir() {
        return Err(Error::MissingDirectory(dir));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION));
        match entry.file_name().into_string() {
            Ok(name) if is_image => names.push(name),
            Ok(name) => log::debug!("skipping non-image file {name}"),
            Err(name) => log::warn!("skipping non-UTF-8 file name {name:?}"),
        }
    }

    names.sort_by(|a, b| match state {
        RampState::Up => compare_ascending(a, b),
        RampState::Down => ramp_sort_key(b)
            .cmp(&ramp_sort_key(a))
            .then_with(|| a.cmp(b)),
    });

    Ok(names
        .into_iter()
        .map(|name| {
            let path = dir.join(&name);
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&name)
                .to_string();
            StackImage {
                label: ImageLabel::new(state, stem),
                path,
            }
        })
        .collect())
}

/// Lists every image of the acquisition: the heating ramp, then the cooling ramp.
///
/// # Errors
/// Returns an error if either ramp directory is missing or unreadable.
pub fn scan_stack(root: &Path) -> Result<Vec<StackImage>> {
    let mut images = Vec::new();
    for state in RampState::ALL {
        let ramp = scan_ramp(root, state)?;
        log::debug!("{state}: {} images", ramp.len());
        images.extend(ramp);
    }
    Ok(images)
}

/// Orders two file names the way [`scan_ramp`] orders a heating ramp.
#[must_use]
pub fn compare_ascending(a: &str, b: &str) -> Ordering {
    ramp_sort_key(a)
        .cmp(&ramp_sort_key(b))
        .then_with(|| a.cmp(b))
}
