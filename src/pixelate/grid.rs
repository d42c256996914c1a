//! Base grid traversal and output assembly
//!
//! The image is scanned in raster order with stride `base_size`. Every tile is
//! subdivided independently against the read-only source; the resulting
//! leaves are painted into a copy of the source once all tiles are done.

use std::time::{Duration, Instant};

use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use super::subdivide::{Partition, Subdivider};
use super::{Block, ParallelConfig, PixelateSettings, RemainderMode};
use crate::buffer::PixelBuffer;
use crate::error::PixelateError;

/// Tiles of the base grid in raster order.
///
/// In [`RemainderMode::Leave`] a tile is square with edge
/// `min(base_size, width - x, height - y)`, so boundary cells are only partly
/// covered. In [`RemainderMode::Fill`] a tile is the whole clipped grid cell.
pub fn tile_grid(width: u32, height: u32, base_size: u32, mode: RemainderMode) -> Vec<Block> {
    let step = base_size.max(1);
    let mut tiles = Vec::new();
    for y in (0..height).step_by(step as usize) {
        for x in (0..width).step_by(step as usize) {
            let tile = match mode {
                RemainderMode::Leave => {
                    Block::square(x, y, step.min(width - x).min(height - y))
                }
                RemainderMode::Fill => {
                    Block::new(x, y, step.min(width - x), step.min(height - y))
                }
            };
            tiles.push(tile);
        }
    }
    tiles
}

/// Counters describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub tiles: usize,
    pub leaves: usize,
    pub splits: usize,
    pub abandoned_blocks: usize,
    pub abandoned_pixels: u64,
    pub painted_pixels: u64,
    pub max_depth: u32,
}

impl RenderStats {
    fn from_partition(partition: &Partition, tiles: usize) -> Self {
        Self {
            tiles,
            leaves: partition.leaves.len(),
            splits: partition.splits,
            abandoned_blocks: partition.abandoned.len(),
            abandoned_pixels: partition.abandoned.iter().map(Block::area).sum(),
            painted_pixels: partition.painted_area(),
            max_depth: partition.max_depth,
        }
    }
}

/// Runs the subdivision over every tile of a source buffer.
pub struct GridDriver<'a> {
    source: &'a PixelBuffer,
    settings: &'a PixelateSettings,
    parallel: ParallelConfig,
    budget: Option<Duration>,
}

impl<'a> GridDriver<'a> {
    /// Sequential driver with no time budget.
    pub fn new(source: &'a PixelBuffer, settings: &'a PixelateSettings) -> Self {
        Self { source, settings, parallel: ParallelConfig::sequential(), budget: None }
    }

    pub fn with_parallelism(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Abort with [`PixelateError::TimedOut`] once this much time has passed.
    ///
    /// The budget is checked before each tile starts; a tile already running
    /// is always finished.
    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.budget = budget;
        self
    }

    /// Subdivide every tile and collect the leaves.
    pub fn partition(&self) -> Result<(Partition, usize), PixelateError> {
        let (width, height) = self.source.dimensions();
        let tiles = tile_grid(width, height, self.settings.base_size, self.settings.remainder);
        debug!(
            "Subdividing {} tiles of {}x{} image (base {}, min {})",
            tiles.len(),
            width,
            height,
            self.settings.base_size,
            self.settings.min_size
        );

        let fork = self.parallel.enabled.then_some(self.parallel.fork_min_size);
        let subdivider = Subdivider::new(self.source, self.settings).with_fork_min_size(fork);
        let started = Instant::now();
        let run_tile = |tile: &Block| -> Result<Partition, PixelateError> {
            self.check_budget(started)?;
            Ok(subdivider.subdivide(*tile))
        };

        let parts: Vec<Partition> = if self.parallel.enabled {
            tiles.par_iter().map(run_tile).collect::<Result<_, _>>()?
        } else {
            tiles.iter().map(run_tile).collect::<Result<_, _>>()?
        };

        let mut partition = Partition::default();
        for part in parts {
            partition.merge(part);
        }
        Ok((partition, tiles.len()))
    }

    /// Produce the filtered image and the run counters.
    ///
    /// The output starts as a copy of the source, so pixels no leaf covers
    /// keep their source values.
    pub fn render(&self) -> Result<(PixelBuffer, RenderStats), PixelateError> {
        let (partition, tiles) = self.partition()?;
        let mut output = self.source.clone();
        for leaf in &partition.leaves {
            output.fill_rect(leaf.block, leaf.color.samples());
        }
        Ok((output, RenderStats::from_partition(&partition, tiles)))
    }

    fn check_budget(&self, started: Instant) -> Result<(), PixelateError> {
        if let Some(budget) = self.budget {
            let elapsed = started.elapsed();
            if elapsed >= budget {
                return Err(PixelateError::TimedOut { budget, elapsed });
            }
        }
        Ok(())
    }
}
