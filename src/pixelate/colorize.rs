//! Representative block colors and the mid-gray boost

use super::{Block, BlockColor};
use crate::buffer::PixelBuffer;

/// Pivot of the boost transform.
pub const MID_GRAY: f64 = 128.0;

/// Per-channel arithmetic mean of `block` in `source`.
///
/// Returns `None` for a block with no pixels. Unused trailing entries are
/// zero for gray buffers.
pub fn average_color(source: &PixelBuffer, block: Block) -> Option<[f64; 3]> {
    let block = source.clip(block);
    if block.is_empty() {
        return None;
    }

    let channels = source.channels().count();
    let mut sums = [0u64; 3];
    for y in block.y..block.y + block.height {
        for px in source.row_span(block.x, y, block.width).chunks_exact(channels) {
            for (sum, &c) in sums.iter_mut().zip(px) {
                *sum += c as u64;
            }
        }
    }

    let n = block.area() as f64;
    Some(sums.map(|s| s as f64 / n))
}

/// Scale a channel's deviation from mid-gray by `color_boost`.
///
/// A boost of exactly `1.0` returns `channel` untouched.
pub fn boost_channel(channel: f64, color_boost: f64) -> f64 {
    if color_boost == 1.0 {
        return channel;
    }
    MID_GRAY + (channel - MID_GRAY) * color_boost
}

/// Clamp to the 8-bit range and truncate toward zero.
pub fn quantize_channel(channel: f64) -> u8 {
    channel.clamp(0.0, 255.0) as u8
}

/// Color a leaf is painted with: block average, boosted, clamped and truncated.
pub fn block_color(source: &PixelBuffer, block: Block, color_boost: f64) -> Option<BlockColor> {
    let mean = average_color(source, block)?;
    Some(BlockColor(mean.map(|c| quantize_channel(boost_channel(c, color_boost)))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    #[test]
    fn test_average_of_uniform_block_is_exact() {
        let buf = PixelBuffer::from_fn(5, 3, Channels::Rgb, |_, _| [17, 200, 99]);
        let mean = average_color(&buf, Block::new(0, 0, 5, 3)).expect("non-empty block");
        assert_eq!(mean, [17.0, 200.0, 99.0]);
    }

    #[test]
    fn test_average_of_gray_block() {
        let buf = PixelBuffer::from_fn(2, 2, Channels::Gray, |x, y| [(x * 10 + y * 20) as u8, 0, 0]);
        let mean = average_color(&buf, Block::square(0, 0, 2)).expect("non-empty block");
        assert_eq!(mean[0], 15.0);
    }

    #[test]
    fn test_identity_boost() {
        for c in [0.0, 12.75, 127.5, 128.0, 254.9] {
            assert_eq!(boost_channel(c, 1.0), c);
        }
    }

    #[test]
    fn test_boost_scales_around_mid_gray() {
        assert_eq!(boost_channel(138.0, 2.0), 148.0);
        assert_eq!(boost_channel(118.0, 0.5), 123.0);
        assert_eq!(boost_channel(128.0, 1.7), 128.0);
    }

    #[test]
    fn test_boost_clamps_near_extremes() {
        assert_eq!(quantize_channel(boost_channel(254.0, 2.0)), 255);
        assert_eq!(quantize_channel(boost_channel(255.0, 2.0)), 255);
        assert_eq!(quantize_channel(boost_channel(1.0, 2.0)), 0);
        assert_eq!(quantize_channel(boost_channel(0.0, 2.0)), 0);
    }

    #[test]
    fn test_quantize_truncates() {
        assert_eq!(quantize_channel(127.5), 127);
        assert_eq!(quantize_channel(0.99), 0);
        assert_eq!(quantize_channel(-3.0), 0);
    }

    #[test]
    fn test_block_color_of_black_and_white() {
        let buf =
            PixelBuffer::from_fn(2, 2, Channels::Gray, |x, _| if x == 0 { [0; 3] } else { [255; 3] });
        let color = block_color(&buf, Block::square(0, 0, 2), 1.0).expect("non-empty block");
        assert_eq!(color.samples()[0], 127);
    }

    #[test]
    fn test_block_color_of_empty_block() {
        let buf = PixelBuffer::from_fn(2, 2, Channels::Gray, |_, _| [0; 3]);
        assert_eq!(block_color(&buf, Block::new(0, 0, 2, 0), 1.0), None);
    }
}
