//! Configuration for the blockpix filter
//!
//! Provides types, discovery and parsing for `blockpix.toml`.

pub mod loader;
pub mod schema;

pub use loader::{
    find_config, find_config_from, find_xdg_config, load_config, merge_cli_overrides,
    resolve_config, CliOverrides, ConfigError, CONFIG_FILE_NAME,
};
pub use schema::*;
