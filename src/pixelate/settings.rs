//! Filter parameters and worker pool options

use serde::{Deserialize, Serialize};

use super::RemainderMode;

/// Parameters of one pixelation run.
///
/// | Field | Range | Default |
/// |-------|-------|---------|
/// | `base_size` | 4-64 | 16 |
/// | `contrast_thresh` | 0-50 | 20 |
/// | `min_size` | 2-16 | 4 |
/// | `blur_radius` | 0-10 | 2 |
/// | `edge_preserve` | 0-1 | 0.5 |
/// | `color_boost` | 0.5-2.0 | 1.0 |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelateSettings {
    /// Edge length of the base grid tiles
    #[serde(default = "default_base_size")]
    pub base_size: u32,
    /// Contrast a block must exceed (after edge scaling) to be split
    #[serde(default = "default_contrast_thresh")]
    pub contrast_thresh: f64,
    /// Smallest block edge the subdivision produces
    #[serde(default = "default_min_size")]
    pub min_size: u32,
    /// Gaussian pre-blur radius; 0 disables the blur
    #[serde(default = "default_blur_radius")]
    pub blur_radius: f32,
    /// 1 uses the raw threshold, 0 triples it
    #[serde(default = "default_edge_preserve")]
    pub edge_preserve: f64,
    /// Scaling of channel deviation from mid-gray
    #[serde(default = "default_color_boost")]
    pub color_boost: f64,
    /// What happens to tile parts smaller than `min_size`
    #[serde(default)]
    pub remainder: RemainderMode,
}

fn default_base_size() -> u32 {
    16
}

fn default_contrast_thresh() -> f64 {
    20.0
}

fn default_min_size() -> u32 {
    4
}

fn default_blur_radius() -> f32 {
    2.0
}

fn default_edge_preserve() -> f64 {
    0.5
}

fn default_color_boost() -> f64 {
    1.0
}

impl Default for PixelateSettings {
    fn default() -> Self {
        Self {
            base_size: default_base_size(),
            contrast_thresh: default_contrast_thresh(),
            min_size: default_min_size(),
            blur_radius: default_blur_radius(),
            edge_preserve: default_edge_preserve(),
            color_boost: default_color_boost(),
            remainder: RemainderMode::default(),
        }
    }
}

/// A setting outside its documented range.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeError {
    /// Name of the offending field
    pub field: &'static str,
    /// What is wrong with it
    pub message: String,
}

impl std::fmt::Display for RangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

fn check_range<T>(errors: &mut Vec<RangeError>, field: &'static str, value: T, min: T, max: T)
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    // NaN fails both comparisons and is rejected too
    if !(value >= min && value <= max) {
        errors.push(RangeError {
            field,
            message: format!("must be between {} and {} (got {})", min, max, value),
        });
    }
}

impl PixelateSettings {
    /// Check every field against its range and return all violations.
    pub fn validate(&self) -> Vec<RangeError> {
        let mut errors = Vec::new();
        check_range(&mut errors, "base_size", self.base_size, 4, 64);
        check_range(&mut errors, "contrast_thresh", self.contrast_thresh, 0.0, 50.0);
        check_range(&mut errors, "min_size", self.min_size, 2, 16);
        check_range(&mut errors, "blur_radius", self.blur_radius, 0.0, 10.0);
        check_range(&mut errors, "edge_preserve", self.edge_preserve, 0.0, 1.0);
        check_range(&mut errors, "color_boost", self.color_boost, 0.5, 2.0);
        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// How tiles and quadrants are spread over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Process tiles concurrently
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Size of a dedicated worker pool; 0 uses rayon's global pool
    #[serde(default)]
    pub threads: usize,
    /// Blocks at least this wide fork their quadrants onto the pool
    #[serde(default = "default_fork_min_size")]
    pub fork_min_size: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_fork_min_size() -> u32 {
    32
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { enabled: true, threads: 0, fork_min_size: default_fork_min_size() }
    }
}

impl ParallelConfig {
    /// Everything on the calling thread.
    pub fn sequential() -> Self {
        Self { enabled: false, ..Self::default() }
    }
}
