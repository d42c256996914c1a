//! Configuration loading and discovery for `blockpix.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::BlockpixConfig;
use crate::codec::OutputFormat;
use crate::pixelate::RemainderMode;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up during discovery.
pub const CONFIG_FILE_NAME: &str = "blockpix.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse blockpix.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_size: Option<u32>,
    pub contrast_thresh: Option<f64>,
    pub min_size: Option<u32>,
    pub blur_radius: Option<f32>,
    pub edge_preserve: Option<f64>,
    pub color_boost: Option<f64>,
    pub remainder: Option<RemainderMode>,
    /// Dedicated worker pool size
    pub threads: Option<usize>,
    /// Force single-threaded processing
    pub sequential: Option<bool>,
    pub quality: Option<u8>,
    pub format: Option<OutputFormat>,
    pub timeout_ms: Option<u64>,
}

/// Find blockpix.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for blockpix.toml
/// 2. Check XDG_CONFIG_HOME/blockpix/blockpix.toml (or ~/.config/blockpix/blockpix.toml)
pub fn find_config() -> Option<PathBuf> {
    // First try walking up from current directory
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    // Fall back to XDG config
    find_xdg_config()
}

/// Find blockpix.toml in XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("blockpix").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find blockpix.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        // Reached root, no config found
        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a blockpix.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("shots/blockpix.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<BlockpixConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("Loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(BlockpixConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<BlockpixConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: BlockpixConfig = toml::from_str(&contents)?;
    validated(config)
}

fn validated(config: BlockpixConfig) -> Result<BlockpixConfig, ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut BlockpixConfig, overrides: &CliOverrides) {
    let pixelate = &mut config.pixelate;
    if let Some(v) = overrides.base_size {
        pixelate.base_size = v;
    }
    if let Some(v) = overrides.contrast_thresh {
        pixelate.contrast_thresh = v;
    }
    if let Some(v) = overrides.min_size {
        pixelate.min_size = v;
    }
    if let Some(v) = overrides.blur_radius {
        pixelate.blur_radius = v;
    }
    if let Some(v) = overrides.edge_preserve {
        pixelate.edge_preserve = v;
    }
    if let Some(v) = overrides.color_boost {
        pixelate.color_boost = v;
    }
    if let Some(v) = overrides.remainder {
        pixelate.remainder = v;
    }

    if let Some(threads) = overrides.threads {
        config.parallel.threads = threads;
    }
    if let Some(sequential) = overrides.sequential {
        config.parallel.enabled = !sequential;
    }

    if let Some(quality) = overrides.quality {
        config.output.quality = quality;
    }
    if let Some(format) = overrides.format {
        config.output.format = format;
    }

    if let Some(timeout_ms) = overrides.timeout_ms {
        config.limits.timeout_ms = Some(timeout_ms);
    }
}

/// Load a config, apply CLI overrides, and validate the merged result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<BlockpixConfig, ConfigError> {
    let mut config = load_config(path)?;
    merge_cli_overrides(&mut config, overrides);
    validated(config)
}
