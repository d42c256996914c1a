//! Configuration schema types for `blockpix.toml`
//!
//! Defines the structure and validation rules for the filter configuration.
//! Every section and field is optional; omitted values take their defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::{OutputFormat, DEFAULT_JPEG_QUALITY};
use crate::pixelate::{ParallelConfig, PixelateSettings};

/// Encoding of exported images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JPEG quality (1-100)
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Format used when the output path does not name one
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { quality: default_quality(), format: OutputFormat::default() }
    }
}

/// Resource limits for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Wall-clock budget per image in milliseconds; unset means unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl LimitsConfig {
    pub fn time_budget(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Complete `blockpix.toml` configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockpixConfig {
    /// Filter parameters
    #[serde(default)]
    pub pixelate: PixelateSettings,
    /// Worker pool options
    #[serde(default)]
    pub parallel: ParallelConfig,
    /// Export options
    #[serde(default)]
    pub output: OutputConfig,
    /// Run limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "pixelate.base_size")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "blockpix.toml: '{}' {}", self.field, self.message)
    }
}

impl BlockpixConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors: Vec<ConfigValidationError> = self
            .pixelate
            .validate()
            .into_iter()
            .map(|e| ConfigValidationError {
                field: format!("pixelate.{}", e.field),
                message: e.message,
            })
            .collect();

        if self.parallel.fork_min_size == 0 {
            errors.push(ConfigValidationError {
                field: "parallel.fork_min_size".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if !(1..=100).contains(&self.output.quality) {
            errors.push(ConfigValidationError {
                field: "output.quality".to_string(),
                message: format!("must be between 1 and 100 (got {})", self.output.quality),
            });
        }

        if self.limits.timeout_ms == Some(0) {
            errors.push(ConfigValidationError {
                field: "limits.timeout_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Starter `blockpix.toml` written by `blockpix init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# blockpix configuration

[pixelate]
base_size = 16          # grid tile edge (4-64)
contrast_thresh = 20.0  # split sensitivity (0-50)
min_size = 4            # smallest block edge (2-16)
blur_radius = 2.0       # pre-blur radius, 0 disables (0-10)
edge_preserve = 0.5     # 1 keeps the raw threshold, 0 triples it
color_boost = 1.0       # deviation from mid-gray scaling (0.5-2.0)
remainder = "leave"     # "leave" or "fill" for sub-min_size edges

[parallel]
enabled = true
threads = 0             # 0 uses one worker per core
fork_min_size = 32

[output]
quality = 95
format = "jpeg"

[limits]
# timeout_ms = 10000
"#;
