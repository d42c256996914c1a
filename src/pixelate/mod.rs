//! Adaptive quadtree pixelation
//!
//! Flat regions of an image collapse into large uniform blocks while detailed
//! regions recurse into smaller ones. The pieces, leaf-first:
//!
//! - [`contrast`]: luminance standard deviation of a block
//! - [`colorize`]: block averages and the mid-gray boost
//! - [`subdivide`]: split-or-leaf decisions over one tile
//! - [`grid`]: the base grid, parallel tile processing and painting
//!
//! [`Pixelator`] ties them together with an optional pre-blur, a dedicated
//! worker pool and a wall-clock budget.
//!
//! # Example
//!
//! ```
//! use blockpix::buffer::{Channels, PixelBuffer};
//! use blockpix::pixelate::{PixelateSettings, Pixelator};
//!
//! let source = PixelBuffer::from_fn(32, 32, Channels::Rgb, |x, _| [(x * 8) as u8, 64, 200]);
//! let settings = PixelateSettings { blur_radius: 0.0, ..Default::default() };
//! let rendering = Pixelator::new(settings).unwrap().pixelate(&source).unwrap();
//! assert_eq!(rendering.image.dimensions(), (32, 32));
//! ```

pub mod block;
pub mod colorize;
pub mod contrast;
pub mod grid;
pub mod settings;
pub mod subdivide;

use std::time::{Duration, Instant};

use log::{debug, info};

pub use block::{Block, BlockColor, Leaf, RemainderMode};
pub use grid::{tile_grid, GridDriver, RenderStats};
pub use settings::{ParallelConfig, PixelateSettings, RangeError};
pub use subdivide::{Partition, Step, Subdivider};

use crate::buffer::PixelBuffer;
use crate::error::PixelateError;
use crate::filter::{Filter, GaussianBlur};

/// Output of one pixelation run.
#[derive(Debug, Clone)]
pub struct Rendering {
    /// Filtered image, same dimensions and channels as the input
    pub image: PixelBuffer,
    pub stats: RenderStats,
}

/// Configured pixelation filter.
pub struct Pixelator {
    settings: PixelateSettings,
    filter: Box<dyn Filter>,
    parallel: ParallelConfig,
    budget: Option<Duration>,
    pool: Option<rayon::ThreadPool>,
}

impl Pixelator {
    /// Create a filter with validated settings, Gaussian pre-blur and
    /// default parallelism.
    pub fn new(settings: PixelateSettings) -> Result<Self, PixelateError> {
        let errors = settings.validate();
        if !errors.is_empty() {
            return Err(PixelateError::InvalidSettings(
                errors.iter().map(|e| e.to_string()).collect(),
            ));
        }
        Ok(Self {
            settings,
            filter: Box::new(GaussianBlur),
            parallel: ParallelConfig::default(),
            budget: None,
            pool: None,
        })
    }

    /// Replace the pre-blur implementation.
    pub fn with_filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.filter = filter;
        self
    }

    /// Configure parallelism, building a dedicated pool when `threads > 0`.
    pub fn with_parallelism(mut self, parallel: ParallelConfig) -> Result<Self, PixelateError> {
        self.pool = if parallel.enabled && parallel.threads > 0 {
            Some(rayon::ThreadPoolBuilder::new().num_threads(parallel.threads).build()?)
        } else {
            None
        };
        self.parallel = parallel;
        Ok(self)
    }

    /// Abort runs that take longer than `budget`.
    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.budget = budget;
        self
    }

    pub fn settings(&self) -> &PixelateSettings {
        &self.settings
    }

    /// Run the filter over `source`.
    ///
    /// The source is blurred first when `blur_radius > 0`; subdivision, block
    /// colors and the untouched remainder all come from the blurred image.
    pub fn pixelate(&self, source: &PixelBuffer) -> Result<Rendering, PixelateError> {
        let started = Instant::now();
        debug!(
            "Pixelating {}x{} {} image with {:?}",
            source.width(),
            source.height(),
            source.channels(),
            self.settings
        );

        let blurred;
        let input = if self.settings.blur_radius > 0.0 {
            blurred = self.filter.blur(source, self.settings.blur_radius);
            &blurred
        } else {
            source
        };

        let driver = GridDriver::new(input, &self.settings)
            .with_parallelism(self.parallel)
            .with_time_budget(self.budget);
        let (image, stats) = match &self.pool {
            Some(pool) => pool.install(|| driver.render())?,
            None => driver.render()?,
        };

        info!(
            "Rendered {} leaves from {} tiles in {:.1?} ({} splits, {} px unpainted)",
            stats.leaves,
            stats.tiles,
            started.elapsed(),
            stats.splits,
            stats.abandoned_pixels
        );
        Ok(Rendering { image, stats })
    }

    /// Run the filter and keep only the statistics.
    pub fn analyze(&self, source: &PixelBuffer) -> Result<RenderStats, PixelateError> {
        Ok(self.pixelate(source)?.stats)
    }
}
