//! brightfield CLI
//!
//! Preprocesses bright-field temperature-ramp image stacks into HDF5 and
//! renders figures of the stored windows.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use brightfield_core::{CropRegion, FftMode, RampState, WindowFilter, WindowMode, WindowParams};
use brightfield_io::{BrightFieldDataset, WindowNames, WindowWriteOptions};
use brightfield_viz::{Colormap, Printer, ScaleBar, Viz, VizOptions};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset error: {0}")]
    Dataset(#[from] brightfield_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] brightfield_core::Error),

    #[error("Figure error: {0}")]
    Viz(#[from] brightfield_viz::Error),

    #[error("Parameter file error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bright-field temperature-ramp preprocessor.
#[derive(Parser)]
#[command(name = "brightfield")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the images of a dataset in acquisition order
    List {
        /// Dataset directory holding Ramp_Up/ and Ramp_Down/
        path: PathBuf,
    },

    /// Crop, filter and store every image in <name>_preprocessed.h5
    Preprocess {
        /// Dataset directory
        path: PathBuf,

        /// First cropped row
        #[arg(long)]
        c1: usize,

        /// First cropped column
        #[arg(long)]
        c2: usize,

        /// Side length of the crop
        #[arg(long)]
        step: usize,

        /// Sample name
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Tile the filtered stack into FFT windows
    Windows {
        /// Dataset directory
        path: PathBuf,

        /// Sample name
        #[arg(long, default_value = "")]
        name: String,

        /// Side length of the stored log windows
        #[arg(long, default_value = "128")]
        target_size: usize,

        /// Upper bound applied after ln(x + 1)
        #[arg(long, default_value = "5.0")]
        filter_threshold: f32,

        /// Recreate existing window datasets
        #[arg(long)]
        overwrite: bool,

        /// JSON file with window parameters; flags below override it
        #[arg(long)]
        params: Option<PathBuf>,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        names: NameArgs,
    },

    /// Print the dataset index and bounding box of a window as JSON
    Locate {
        /// Dataset directory
        path: PathBuf,

        /// Image index
        t: usize,

        /// Window row
        a: usize,

        /// Window column
        b: usize,

        /// Sample name
        #[arg(long, default_value = "")]
        name: String,

        #[command(flatten)]
        names: NameArgs,
    },

    /// Render a raw image
    ViewRaw {
        /// Dataset directory
        path: PathBuf,

        /// Ramp state (up or down)
        state: RampState,

        /// Temperature, the image file stem
        temperature: String,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        #[command(flatten)]
        figure: FigureArgs,
    },

    /// Render a window next to the filtered image it was cut from
    ViewWindow {
        /// Dataset directory
        path: PathBuf,

        /// Image index
        t: usize,

        /// Window row
        a: usize,

        /// Window column
        b: usize,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Sample name
        #[arg(long, default_value = "")]
        name: String,

        #[command(flatten)]
        names: NameArgs,

        #[command(flatten)]
        figure: FigureArgs,
    },
}

/// Window parameter overrides.
#[derive(Args, Debug, Default)]
struct WindowArgs {
    /// fft or image
    #[arg(long)]
    mode: Option<WindowMode>,

    /// abs or phase
    #[arg(long)]
    fft_mode: Option<FftMode>,

    /// hamming or none
    #[arg(long)]
    filter: Option<WindowFilter>,

    /// Window height in pixels
    #[arg(long)]
    window_size_x: Option<usize>,

    /// Window width in pixels
    #[arg(long)]
    window_size_y: Option<usize>,

    /// Row stride between windows
    #[arg(long)]
    window_step_x: Option<usize>,

    /// Column stride between windows
    #[arg(long)]
    window_step_y: Option<usize>,

    /// Spectrum zoom factor
    #[arg(long)]
    zoom_factor: Option<usize>,
}

impl WindowArgs {
    fn apply(&self, mut params: WindowParams) -> WindowParams {
        if let Some(mode) = self.mode {
            params.mode = mode;
        }
        if let Some(fft_mode) = self.fft_mode {
            params.fft_mode = fft_mode;
        }
        if let Some(filter) = self.filter {
            params.filter = filter;
        }
        if let Some(v) = self.window_size_x {
            params.window_size_x = v;
        }
        if let Some(v) = self.window_size_y {
            params.window_size_y = v;
        }
        if let Some(v) = self.window_step_x {
            params.window_step_x = v;
        }
        if let Some(v) = self.window_step_y {
            params.window_step_y = v;
        }
        if let Some(v) = self.zoom_factor {
            params.zoom_factor = v;
        }
        params
    }
}

/// Prefixes of the window group and datasets.
#[derive(Args, Debug, Default)]
struct NameArgs {
    /// Prefix of the window group
    #[arg(long, default_value = "")]
    windows_group: String,

    /// Prefix of the window dataset
    #[arg(long, default_value = "")]
    dset_name: String,

    /// Prefix of the log window dataset
    #[arg(long, default_value = "")]
    logset_name: String,
}

impl NameArgs {
    fn to_names(&self) -> WindowNames {
        WindowNames {
            windows_group: self.windows_group.clone(),
            dset_name: self.dset_name.clone(),
            logset_name: self.logset_name.clone(),
        }
    }
}

/// Figure rendering flags.
#[derive(Args, Debug)]
struct FigureArgs {
    /// viridis, gray or hot
    #[arg(long, default_value = "viridis", value_parser = parse_colormap)]
    cmap: Colormap,

    /// Physical image width for a scale bar
    #[arg(long, requires = "scale_length")]
    image_width: Option<f64>,

    /// Physical length of the scale bar
    #[arg(long, requires = "image_width")]
    scale_length: Option<f64>,

    /// Scale bar units
    #[arg(long, default_value = "nm")]
    units: String,
}

impl FigureArgs {
    fn to_options(&self, out: &Path) -> Result<VizOptions> {
        let scalebar = match (self.image_width, self.scale_length) {
            (Some(width), Some(length)) => Some(ScaleBar::new(width, length, &self.units)?),
            _ => None,
        };
        Ok(VizOptions {
            color_map: self.cmap,
            printer: Some(Printer::new(out)),
            scalebar,
        })
    }
}

fn parse_colormap(s: &str) -> std::result::Result<Colormap, String> {
    s.parse().map_err(|e: brightfield_viz::Error| e.to_string())
}

fn load_params(path: Option<&Path>) -> Result<WindowParams> {
    let Some(path) = path else {
        return Ok(WindowParams::default());
    };
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List { path } => {
            let dataset = BrightFieldDataset::open(&path)?;
            for (i, label) in dataset.labels().iter().enumerate() {
                println!("{i}\t{label}");
            }
        }

        Commands::Preprocess {
            path,
            c1,
            c2,
            step,
            name,
        } => {
            let start = Instant::now();
            let dataset = BrightFieldDataset::open(&path)?;
            dataset.write_h5(CropRegion::new(c1, c2, step), &name)?;
            println!(
                "Wrote {} images to {} in {:.2}s",
                dataset.len(),
                dataset.preprocessed_path(&name).display(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Windows {
            path,
            name,
            target_size,
            filter_threshold,
            overwrite,
            params,
            window,
            names,
        } => {
            let start = Instant::now();
            let params = window.apply(load_params(params.as_deref())?);
            let dataset = BrightFieldDataset::open(&path)?;
            let options = WindowWriteOptions {
                name,
                names: names.to_names(),
                target_size,
                filter_threshold,
                overwrite,
                params,
            };
            let windowing = dataset.write_windows(&options)?;
            println!(
                "Wrote windows of {} images ({}x{}) in {:.2}s",
                dataset.len(),
                target_size,
                target_size,
                start.elapsed().as_secs_f64()
            );
            println!("{}", serde_json::to_string_pretty(windowing.params())?);
        }

        Commands::Locate {
            path,
            t,
            a,
            b,
            name,
            names,
        } => {
            let dataset = BrightFieldDataset::open(&path)?;
            let location = dataset.window_location(t, a, b, &name, &names.to_names())?;
            println!("{}", serde_json::to_string(&location)?);
        }

        Commands::ViewRaw {
            path,
            state,
            temperature,
            out,
            figure,
        } => {
            let dataset = BrightFieldDataset::open(&path)?;
            let viz = Viz::new(&dataset, figure.to_options(&out)?);
            viz.view_raw(state, &temperature)?;
        }

        Commands::ViewWindow {
            path,
            t,
            a,
            b,
            out,
            name,
            names,
            figure,
        } => {
            let dataset = BrightFieldDataset::open(&path)?;
            let viz = Viz::new(&dataset, figure.to_options(&out)?);
            viz.view_window(t, a, b, &name, &names.to_names())?;
        }
    }

    Ok(())
}
