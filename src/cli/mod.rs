//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod analyze;
mod init;
mod render;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::codec::OutputFormat;
use crate::config::{resolve_config, BlockpixConfig, CliOverrides, ConfigError};
use crate::error::PixelateError;
use crate::pipeline::Pipeline;
use crate::pixelate::{Pixelator, RemainderMode};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Extensions picked up when the input is a directory.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Check if a path has a supported image extension.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Find all image files in a directory (recursively), sorted by path.
pub fn find_image_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let dir_str = dir.display().to_string();

    if let Ok(paths) = glob(&format!("{}/**/*", dir_str)) {
        files.extend(paths.filter_map(Result::ok).filter(|p| p.is_file() && is_image_file(p)));
    }

    files.sort();
    files
}

/// Blockpix - Adaptive quadtree pixel-art filter
#[derive(Parser)]
#[command(name = "blockpix")]
#[command(about = "Blockpix - Turn images into adaptive pixel art")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Filter and runtime options shared by the image commands
#[derive(Args, Debug, Clone, Default)]
pub struct PixelateArgs {
    /// Grid tile edge length (4-64)
    #[arg(long)]
    pub base_size: Option<u32>,

    /// Base split sensitivity (0-50)
    #[arg(long)]
    pub contrast_thresh: Option<f64>,

    /// Smallest block edge (2-16)
    #[arg(long)]
    pub min_size: Option<u32>,

    /// Gaussian pre-blur radius, 0 disables (0-10)
    #[arg(long)]
    pub blur_radius: Option<f32>,

    /// Edge preservation: 1 keeps the threshold, 0 triples it (0-1)
    #[arg(long)]
    pub edge_preserve: Option<f64>,

    /// Saturation scaling around mid-gray (0.5-2.0)
    #[arg(long)]
    pub color_boost: Option<f64>,

    /// Handling of tile edges smaller than the minimum block size
    #[arg(long, value_enum)]
    pub remainder: Option<RemainderMode>,

    /// Size of a dedicated worker pool (0 = one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Process everything on the calling thread
    #[arg(long)]
    pub sequential: bool,

    /// Abort an image after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Path to blockpix.toml (default: discovered from the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl PixelateArgs {
    /// CLI values that override the config file.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            base_size: self.base_size,
            contrast_thresh: self.contrast_thresh,
            min_size: self.min_size,
            blur_radius: self.blur_radius,
            edge_preserve: self.edge_preserve,
            color_boost: self.color_boost,
            remainder: self.remainder,
            threads: self.threads,
            sequential: self.sequential.then_some(true),
            timeout_ms: self.timeout_ms,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pixelate an image (or every image in a directory)
    Render {
        /// Input image file or directory of images
        input: PathBuf,

        /// Output file or directory.
        /// If omitted: {input}_pixelated.jpg next to the input
        /// If directory (ends with / or exists): dir/{input}_pixelated.jpg
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        pixelate: PixelateArgs,

        /// JPEG quality (1-100, default: 95)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,

        /// Output format (default: from the output extension, else jpeg)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Print subdivision statistics
        #[arg(long)]
        stats: bool,

        /// Print a JSON report per image
        #[arg(long)]
        json: bool,

        /// Export to a temporary JPEG file and print its path
        #[arg(long, conflicts_with = "output")]
        temp: bool,
    },

    /// Show how an image would be subdivided, without writing output
    Analyze {
        /// Input image file or directory of images
        input: PathBuf,

        #[command(flatten)]
        pixelate: PixelateArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter blockpix.toml
    Init {
        /// Target file or directory (default: ./blockpix.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Load the config and apply CLI overrides, reporting failures.
pub(crate) fn load_effective_config(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<BlockpixConfig, ExitCode> {
    resolve_config(config_path, overrides).map_err(|e| {
        eprintln!("Error: {}", e);
        match e {
            ConfigError::Validation(_) => ExitCode::from(EXIT_INVALID_ARGS),
            _ => ExitCode::from(EXIT_ERROR),
        }
    })
}

/// Build the pipeline described by a resolved config.
pub(crate) fn build_pipeline(config: &BlockpixConfig) -> Result<Pipeline, PixelateError> {
    let pixelator = Pixelator::new(config.pixelate)?
        .with_parallelism(config.parallel)?
        .with_time_budget(config.limits.time_budget());
    Ok(Pipeline::new(pixelator))
}

/// Expand the input argument into the list of images to process.
pub(crate) fn collect_inputs(input: &Path) -> Result<(Vec<PathBuf>, bool), ExitCode> {
    if input.is_dir() {
        let files = find_image_files(input);
        if files.is_empty() {
            eprintln!("Error: No image files found in {}", input.display());
            return Err(ExitCode::from(EXIT_ERROR));
        }
        Ok((files, true))
    } else {
        Ok((vec![input.to_path_buf()], false))
    }
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render { input, output, pixelate, quality, format, stats, json, temp } => {
            render::run_render(
                &input,
                output.as_deref(),
                &pixelate,
                quality,
                format,
                stats,
                json,
                temp,
            )
        }
        Commands::Analyze { input, pixelate, json } => {
            analyze::run_analyze(&input, &pixelate, json)
        }
        Commands::Init { path, force } => init::run_init(path.as_deref(), force),
    }
}
