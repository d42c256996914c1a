//! Block rectangles and the leaves the subdivision produces

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// An axis-aligned pixel rectangle.
///
/// Blocks are square while the subdivision runs inside a full tile. They only
/// become rectangular when clipped at the image boundary or, in
/// [`RemainderMode::Fill`], when a boundary tile is narrower than it is tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Block {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// A square block with edge `size`.
    pub fn square(x: u32, y: u32, size: u32) -> Self {
        Self { x, y, width: size, height: size }
    }

    /// Edge length used by the split and floor rules.
    ///
    /// For square blocks this is simply the edge; rectangles use their longer side.
    pub fn size(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if the two blocks share at least one pixel.
    pub fn overlaps(&self, other: &Block) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Split into quadrants in NW, NE, SW, SE order.
    ///
    /// With [`RemainderMode::Leave`] every quadrant is a square of edge
    /// `size / 2`, so odd edges lose their last row and column. With
    /// [`RemainderMode::Fill`] the halves absorb the odd pixel and the four
    /// quadrants cover the block exactly; some may have zero area.
    pub fn quadrants(&self, mode: RemainderMode) -> [Block; 4] {
        match mode {
            RemainderMode::Leave => {
                let half = self.size() / 2;
                [
                    Block::square(self.x, self.y, half),
                    Block::square(self.x + half, self.y, half),
                    Block::square(self.x, self.y + half, half),
                    Block::square(self.x + half, self.y + half, half),
                ]
            }
            RemainderMode::Fill => {
                let w0 = self.width / 2;
                let h0 = self.height / 2;
                let (w1, h1) = (self.width - w0, self.height - h0);
                [
                    Block::new(self.x, self.y, w0, h0),
                    Block::new(self.x + w0, self.y, w1, h0),
                    Block::new(self.x, self.y + h0, w0, h1),
                    Block::new(self.x + w0, self.y + h0, w1, h1),
                ]
            }
        }
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@({},{})", self.width, self.height, self.x, self.y)
    }
}

/// How to treat parts of a tile the subdivision cannot reach.
///
/// Blocks below `min_size` and the strips lost when an odd edge is halved are
/// remainders. `Leave` keeps the pre-filter pixels there; `Fill` paints them
/// with their own average like any other leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RemainderMode {
    /// Abandon remainders, keeping the (blurred) input pixels
    #[default]
    Leave,
    /// Paint remainders with their average color
    Fill,
}

impl std::fmt::Display for RemainderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemainderMode::Leave => write!(f, "leave"),
            RemainderMode::Fill => write!(f, "fill"),
        }
    }
}

/// Representative color of a leaf, stored as up to three channel samples.
///
/// Gray colors only use the first sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockColor(pub [u8; 3]);

impl BlockColor {
    pub fn samples(&self) -> &[u8; 3] {
        &self.0
    }
}

/// A block where the subdivision stopped, with the color it is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub block: Block,
    pub color: BlockColor,
    /// Number of splits between the tile and this leaf
    pub depth: u32,
}
