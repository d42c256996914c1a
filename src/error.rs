//! Error type shared by the pixelation core, the codec and the output layer

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while preparing, running or exporting a pixelation.
///
/// The subdivision itself never fails: degenerate blocks are skipped and
/// abandoned locally. Everything here comes from the layers around it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PixelateError {
    /// Raw pixel data does not match the declared dimensions
    #[error("Pixel data has {actual} bytes, expected {expected} ({width}x{height}x{channels})")]
    BufferSize { width: u32, height: u32, channels: usize, expected: usize, actual: usize },
    /// Channel count that cannot be normalized to gray or RGB
    #[error("Unsupported channel count: {0} (expected 1-4)")]
    UnsupportedChannels(usize),
    /// Settings outside their documented ranges
    #[error("Invalid settings:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    InvalidSettings(Vec<String>),
    /// Image decoding or encoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// File I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Temporary export file could not be kept on disk
    #[error("Failed to persist temporary file: {0}")]
    Persist(#[from] tempfile::PersistError),
    /// Output file extension does not name a supported format
    #[error("Unsupported output format for '{}' (use .png, .jpg or .jpeg)", .0.display())]
    UnsupportedFormat(PathBuf),
    /// Worker pool could not be built
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// The wall-clock budget ran out between tiles
    #[error("Time budget of {budget:?} exceeded after {elapsed:?}")]
    TimedOut { budget: Duration, elapsed: Duration },
}
