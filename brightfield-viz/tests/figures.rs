#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
use brightfield_core::{CropRegion, RampState, WindowParams};
use brightfield_io::{BrightFieldDataset, WindowNames, WindowWriteOptions};
use brightfield_viz::{
    Colormap, Printer, ScaleBar, Viz, VizOptions, BOX_COLOR, RAW_FIGURE_SIZE, WINDOW_FIGURE_SIZE,
};
use image::{GrayImage, Luma};
use plotters::style::RGBColor;
use std::path::Path;
use tempfile::TempDir;

fn write_png(dir: &Path, name: &str) {
    std::fs::create_dir_all(dir).unwrap();
    let img = GrayImage::from_fn(96, 96, |x, y| {
        Luma([(100.0 + 60.0 * (f64::from(x) * 0.7).sin() + f64::from(y) * 0.5) as u8])
    });
    img.save(dir.join(name)).unwrap();
}

fn make_dataset() -> (TempDir, BrightFieldDataset) {
    let root = TempDir::new().unwrap();
    write_png(&root.path().join("Ramp_Up"), "30.png");
    write_png(&root.path().join("Ramp_Down"), "30.png");
    let dataset = BrightFieldDataset::open(root.path()).unwrap();
    (root, dataset)
}

#[test]
fn test_view_raw_saves_figure() {
    let (root, dataset) = make_dataset();
    let out = root.path().join("figures");
    let options = VizOptions {
        color_map: Colormap::Grayscale,
        printer: Some(Printer::new(&out)),
        scalebar: Some(ScaleBar::new(960.0, 240.0, "nm").unwrap()),
    };
    let viz = Viz::new(&dataset, options);

    let figure = viz.view_raw(RampState::Up, "30").unwrap();
    assert_eq!(figure.dimensions(), RAW_FIGURE_SIZE);
    assert!(out.join("Ramp_Up_30_raw.png").exists());
    assert!(viz.view_raw(RampState::Up, "31").is_err());
}

#[test]
fn test_view_window_layout() {
    let (root, dataset) = make_dataset();
    dataset.write_h5(CropRegion::new(0, 0, 64), "s").unwrap();
    let options = WindowWriteOptions {
        name: "s".to_string(),
        target_size: 16,
        params: WindowParams {
            window_size_x: 32,
            window_size_y: 32,
            window_step_x: 16,
            window_step_y: 16,
            ..WindowParams::default()
        },
        ..WindowWriteOptions::default()
    };
    dataset.write_windows(&options).unwrap();

    let out = root.path().join("figures");
    let viz = Viz::new(
        &dataset,
        VizOptions {
            printer: Some(Printer::new(&out)),
            ..VizOptions::default()
        },
    );
    let names = WindowNames::default();
    let figure = viz.view_window(1, 1, 2, "s", &names).unwrap();
    assert_eq!(figure.dimensions(), WINDOW_FIGURE_SIZE);
    assert!(out.join("s_1_1_2_window.png").exists());

    // window (1, 2) spans rows 16..48 and columns 32..64: its outline lies in
    // the right half of the full image panel and nowhere in the tile panels
    let RGBColor(r, g, b) = BOX_COLOR;
    let full_width = WINDOW_FIGURE_SIZE.0 * 2 / 3;
    let outline: Vec<u32> = figure
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0 == [r, g, b])
        .map(|(x, _, _)| x)
        .collect();
    assert!(!outline.is_empty());
    assert!(outline.iter().all(|&x| x > full_width / 3 && x < full_width));

    // both tile panels carry a heatmap, not just the white background
    let (_, height) = WINDOW_FIGURE_SIZE;
    for (lo, hi) in [(0, height / 2), (height / 2, height)] {
        assert!(figure
            .enumerate_pixels()
            .filter(|(x, y, _)| *x > full_width && (lo..hi).contains(y))
            .any(|(_, _, p)| p.0 != [255, 255, 255] && p.0 != [0, 0, 0]));
    }

    assert!(viz.view_window(2, 0, 0, "s", &names).is_err());
}
