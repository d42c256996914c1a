//! Init command: write a starter blockpix.toml

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{CONFIG_FILE_NAME, DEFAULT_CONFIG_TOML};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Resolve the file `init` writes to.
///
/// A missing path means `./blockpix.toml`; an existing directory or a path
/// ending in `/` gets `blockpix.toml` appended.
fn target_path(path: Option<&Path>) -> PathBuf {
    match path {
        None => PathBuf::from(CONFIG_FILE_NAME),
        Some(p) if p.is_dir() || p.as_os_str().to_string_lossy().ends_with('/') => {
            p.join(CONFIG_FILE_NAME)
        }
        Some(p) => p.to_path_buf(),
    }
}

/// Execute the init command
pub fn run_init(path: Option<&Path>, force: bool) -> ExitCode {
    let target = target_path(path);

    if target.exists() && !force {
        eprintln!("Error: '{}' already exists", target.display());
        eprintln!("Use --force to overwrite it");
        return ExitCode::from(EXIT_ERROR);
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error: Failed to create directory: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    match fs::write(&target, DEFAULT_CONFIG_TOML) {
        Ok(()) => {
            println!("Created {}", target.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to write file: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
