//! Adaptive quadtree subdivision of a single tile
//!
//! Each block goes through one decision:
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | size < `min_size` | abandoned (`leave`) or leaf (`fill`) |
//! | no pixels after clipping | skipped |
//! | contrast > threshold and size > 2 × `min_size` | split into NW, NE, SW, SE |
//! | otherwise | leaf painted with the block average |
//!
//! The walk uses an explicit stack of `(block, depth)` work items. Large
//! blocks can fork their quadrants onto the rayon pool; every task returns its
//! own [`Partition`] and nothing is written to the output here.

use super::colorize::block_color;
use super::contrast::{adaptive_threshold, block_contrast};
use super::{Block, BlockColor, Leaf, PixelateSettings, RemainderMode};
use crate::buffer::PixelBuffer;

/// Outcome of evaluating one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Block has no pixels inside the image
    Skip,
    /// Block is below `min_size` and stays unpainted
    Abandon,
    /// Block is split into these quadrants
    Split([Block; 4]),
    /// Block is painted uniformly
    Leaf(BlockColor),
}

/// Leaves and bookkeeping produced by subdividing one or more tiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub leaves: Vec<Leaf>,
    pub abandoned: Vec<Block>,
    pub splits: usize,
    /// Deepest level any evaluated block reached
    pub max_depth: u32,
}

impl Partition {
    /// Fold another partition into this one.
    pub fn merge(&mut self, other: Partition) {
        self.leaves.extend(other.leaves);
        self.abandoned.extend(other.abandoned);
        self.splits += other.splits;
        self.max_depth = self.max_depth.max(other.max_depth);
    }

    /// Number of pixels covered by leaves.
    pub fn painted_area(&self) -> u64 {
        self.leaves.iter().map(|leaf| leaf.block.area()).sum()
    }
}

/// Decision engine for one source buffer and one set of settings.
pub struct Subdivider<'a> {
    source: &'a PixelBuffer,
    min_size: u32,
    threshold: f64,
    color_boost: f64,
    remainder: RemainderMode,
    fork_min_size: Option<u32>,
}

impl<'a> Subdivider<'a> {
    /// Create a sequential subdivider reading from `source`.
    pub fn new(source: &'a PixelBuffer, settings: &PixelateSettings) -> Self {
        Self {
            source,
            // A zero floor would let 1x1 blocks split forever in fill mode
            min_size: settings.min_size.max(1),
            threshold: adaptive_threshold(settings.contrast_thresh, settings.edge_preserve),
            color_boost: settings.color_boost,
            remainder: settings.remainder,
            fork_min_size: None,
        }
    }

    /// Fork quadrant evaluation of blocks at least `size` wide; `None` stays sequential.
    pub fn with_fork_min_size(mut self, size: Option<u32>) -> Self {
        self.fork_min_size = size;
        self
    }

    /// Effective split threshold after edge scaling.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Decide what happens to a single block.
    pub fn evaluate(&self, block: Block) -> Step {
        if block.size() < self.min_size {
            return match self.remainder {
                RemainderMode::Leave if block.is_empty() => Step::Skip,
                RemainderMode::Leave => Step::Abandon,
                RemainderMode::Fill => self.leaf(block),
            };
        }

        let Some(contrast) = block_contrast(self.source, block) else {
            return Step::Skip;
        };

        if contrast > self.threshold && block.size() > 2 * self.min_size {
            Step::Split(block.quadrants(self.remainder))
        } else {
            self.leaf(block)
        }
    }

    fn leaf(&self, block: Block) -> Step {
        match block_color(self.source, block, self.color_boost) {
            Some(color) => Step::Leaf(color),
            None => Step::Skip,
        }
    }

    /// Subdivide a tile into leaves.
    pub fn subdivide(&self, tile: Block) -> Partition {
        let mut partition = Partition::default();
        self.walk(tile, 0, &mut partition);
        partition
    }

    fn walk(&self, root: Block, root_depth: u32, out: &mut Partition) {
        let mut stack = vec![(root, root_depth)];

        while let Some((block, depth)) = stack.pop() {
            out.max_depth = out.max_depth.max(depth);

            match self.evaluate(block) {
                Step::Skip => {}
                Step::Abandon => out.abandoned.push(block),
                Step::Leaf(color) => {
                    let block = self.source.clip(block);
                    out.leaves.push(Leaf { block, color, depth });
                }
                Step::Split(quadrants) => {
                    out.splits += 1;
                    if self.should_fork(&block) {
                        out.merge(self.fork(quadrants, depth + 1));
                    } else {
                        // Reversed so NW is popped first
                        stack.extend(quadrants.iter().rev().map(|&q| (q, depth + 1)));
                    }
                }
            }
        }
    }

    fn should_fork(&self, block: &Block) -> bool {
        self.fork_min_size.is_some_and(|min| block.size() >= min)
    }

    fn fork(&self, [nw, ne, sw, se]: [Block; 4], depth: u32) -> Partition {
        let run = |block: Block| {
            let mut partition = Partition::default();
            self.walk(block, depth, &mut partition);
            partition
        };

        let ((mut merged, b), (c, d)) =
            rayon::join(|| rayon::join(|| run(nw), || run(ne)), || rayon::join(|| run(sw), || run(se)));
        merged.merge(b);
        merged.merge(c);
        merged.merge(d);
        merged
    }
}
