//! Analyze command: subdivision statistics without writing images

use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

use crate::pipeline::Input;
use crate::pixelate::RenderStats;

use super::render::print_stats;
use super::{build_pipeline, collect_inputs, load_effective_config, PixelateArgs, EXIT_ERROR, EXIT_SUCCESS};

#[derive(Debug, Serialize)]
struct AnalysisReport<'a> {
    input: &'a Path,
    width: u32,
    height: u32,
    channels: String,
    threshold: f64,
    stats: RenderStats,
}

/// Execute the analyze command
pub fn run_analyze(input: &Path, args: &PixelateArgs, json: bool) -> ExitCode {
    let config = match load_effective_config(args.config.as_deref(), &args.overrides()) {
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
    let (files, _) = match collect_inputs(input) {
        Ok(found) => found,
        Err(code) => return code,
    };

    let threshold = crate::pixelate::contrast::adaptive_threshold(
        config.pixelate.contrast_thresh,
        config.pixelate.edge_preserve,
    );

    let mut reports = Vec::new();
    let mut failed = false;
    for file in &files {
        let Some(source) = pipeline.load(&Input::Path(file.clone())) else {
            eprintln!("Error: no result for '{}' (missing or undecodable image)", file.display());
            failed = true;
            continue;
        };
        let stats = match pipeline.pixelator().analyze(&source) {
            Ok(stats) => stats,
            Err(e) => {
                eprintln!("Error: {}: {}", file.display(), e);
                failed = true;
                continue;
            }
        };

        if json {
            reports.push(AnalysisReport {
                input: file,
                width: source.width(),
                height: source.height(),
                channels: source.channels().to_string(),
                threshold,
                stats,
            });
        } else {
            println!(
                "{} ({}x{}, {}, threshold {:.1})",
                file.display(),
                source.width(),
                source.height(),
                source.channels(),
                threshold
            );
            print_stats(&stats);
        }
    }

    if json {
        let text = if reports.len() == 1 {
            serde_json::to_string_pretty(&reports[0])
        } else {
            serde_json::to_string_pretty(&reports)
        };
        match text {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
