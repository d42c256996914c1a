//! Render command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::codec::OutputFormat;
use crate::output::{export_temp_jpeg, generate_output_path, save_image};
use crate::pipeline::Input;
use crate::pixelate::RenderStats;

use super::{
    build_pipeline, collect_inputs, load_effective_config, PixelateArgs, EXIT_ERROR,
    EXIT_INVALID_ARGS, EXIT_SUCCESS,
};

/// Per-image report printed with `--json`
#[derive(Debug, Serialize)]
struct RenderReport<'a> {
    input: &'a Path,
    output: &'a Path,
    width: u32,
    height: u32,
    stats: &'a RenderStats,
}

/// Execute the render command
#[allow(clippy::too_many_arguments)]
pub fn run_render(
    input: &Path,
    output: Option<&Path>,
    args: &PixelateArgs,
    quality: Option<u8>,
    format: Option<OutputFormat>,
    show_stats: bool,
    json: bool,
    temp: bool,
) -> ExitCode {
    let mut overrides = args.overrides();
    overrides.quality = quality;
    overrides.format = format;
    let config = match load_effective_config(args.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (files, is_batch) = match collect_inputs(input) {
        Ok(found) => found,
        Err(code) => return code,
    };
    if temp && is_batch {
        eprintln!("Error: --temp exports a single image; pass a file, not a directory");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut failed = false;
    for file in &files {
        let rendering = match pipeline.run(Some(&Input::Path(file.clone()))) {
            Ok(Some(rendering)) => rendering,
            Ok(None) => {
                eprintln!("Error: no result for '{}' (missing or undecodable image)", file.display());
                failed = true;
                continue;
            }
            Err(e) => {
                eprintln!("Error: {}: {}", file.display(), e);
                failed = true;
                continue;
            }
        };

        let written: PathBuf = if temp {
            match export_temp_jpeg(&rendering.image, config.output.quality, pipeline.codec()) {
                Ok(path) => path,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    failed = true;
                    continue;
                }
            }
        } else {
            let path = generate_output_path(file, output, config.output.format, is_batch);
            if let Err(e) =
                save_image(&rendering.image, &path, format, config.output.quality, pipeline.codec())
            {
                eprintln!("Error: {}", e);
                failed = true;
                continue;
            }
            path
        };

        if json {
            let (width, height) = rendering.image.dimensions();
            let report = RenderReport {
                input: file,
                output: &written,
                width,
                height,
                stats: &rendering.stats,
            };
            match serde_json::to_string_pretty(&report) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    failed = true;
                }
            }
        } else if temp {
            println!("{}", written.display());
        } else {
            println!("Saved: {}", written.display());
        }

        if show_stats && !json {
            print_stats(&rendering.stats);
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Print subdivision counters in a human-readable form.
pub(crate) fn print_stats(stats: &RenderStats) {
    println!("  Tiles:      {}", stats.tiles);
    println!("  Leaves:     {}", stats.leaves);
    println!("  Splits:     {}", stats.splits);
    println!("  Max depth:  {}", stats.max_depth);
    println!("  Painted:    {} px", stats.painted_pixels);
    if stats.abandoned_blocks > 0 {
        println!(
            "  Unpainted:  {} px in {} blocks",
            stats.abandoned_pixels, stats.abandoned_blocks
        );
    }
}
