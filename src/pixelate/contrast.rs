//! Block contrast: standard deviation of per-pixel luminance

use super::Block;
use crate::buffer::PixelBuffer;

/// Contrast score of `block` within `source`.
///
/// Luminance is the unweighted mean of a pixel's channels and the score is
/// the population standard deviation of luminance over the block. Returns
/// `None` when the block (after clipping to the buffer) has no pixels.
///
/// Moments are accumulated over integer channel sums and only divided at the
/// end, so any uniform block scores exactly `0.0`.
pub fn block_contrast(source: &PixelBuffer, block: Block) -> Option<f64> {
    let block = source.clip(block);
    if block.is_empty() {
        return None;
    }

    let channels = source.channels().count();
    let mut sum: u128 = 0;
    let mut sum_sq: u128 = 0;
    for y in block.y..block.y + block.height {
        for px in source.row_span(block.x, y, block.width).chunks_exact(channels) {
            let luma: u128 = px.iter().map(|&c| c as u128).sum();
            sum += luma;
            sum_sq += luma * luma;
        }
    }

    // n² · variance of the channel sums, exact in integers
    let n = block.area() as u128;
    let scaled_variance = n * sum_sq - sum * sum;
    let std_of_sums = (scaled_variance as f64).sqrt() / n as f64;
    Some(std_of_sums / channels as f64)
}

/// Threshold a block's contrast must exceed to be split.
///
/// `edge_preserve = 1` keeps `contrast_thresh` as is; lower values inflate it
/// up to three times, favouring larger uniform blocks.
pub fn adaptive_threshold(contrast_thresh: f64, edge_preserve: f64) -> f64 {
    contrast_thresh * (1.0 + (1.0 - edge_preserve) * 2.0)
}
