//! In-memory pixel buffers
//!
//! Every image entering the filter is normalized to one of two layouts:
//! 8-bit gray or 8-bit RGB. Alpha is dropped without compositing and wider
//! sample types are converted down, so the rest of the crate only ever sees
//! 1 or 3 interleaved `u8` channels per pixel.

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::PixelateError;
use crate::pixelate::Block;

/// Channel layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channels {
    /// One luminance channel
    Gray,
    /// Red, green and blue channels
    Rgb,
}

impl Channels {
    /// Number of interleaved samples per pixel.
    pub fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

impl std::fmt::Display for Channels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channels::Gray => write!(f, "gray"),
            Channels::Rgb => write!(f, "rgb"),
        }
    }
}

/// A row-major grid of 8-bit pixels with a gray or RGB layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw interleaved data, checking that its length matches the dimensions.
    pub fn new(
        width: u32,
        height: u32,
        channels: Channels,
        data: Vec<u8>,
    ) -> Result<Self, PixelateError> {
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(PixelateError::BufferSize {
                width,
                height,
                channels: channels.count(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, channels, data })
    }

    /// Build a buffer by evaluating `f` at every pixel.
    ///
    /// `f` returns an RGB triple; for gray buffers only the first component is used.
    pub fn from_fn<F>(width: u32, height: u32, channels: Channels, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let n = channels.count();
        let mut data = Vec::with_capacity(width as usize * height as usize * n);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y)[..n]);
            }
        }
        Self { width, height, channels, data }
    }

    /// Wrap raw interleaved data with 1 to 4 channels, normalizing the layout.
    ///
    /// | Channels | Interpreted as | Result |
    /// |----------|----------------|--------|
    /// | 1 | gray | gray |
    /// | 2 | gray + alpha | gray (alpha dropped) |
    /// | 3 | RGB | RGB |
    /// | 4 | RGBA | RGB (alpha dropped) |
    pub fn from_interleaved(
        width: u32,
        height: u32,
        channel_count: usize,
        data: Vec<u8>,
    ) -> Result<Self, PixelateError> {
        let (channels, keep) = match channel_count {
            1 => (Channels::Gray, 1),
            2 => (Channels::Gray, 1),
            3 => (Channels::Rgb, 3),
            4 => (Channels::Rgb, 3),
            n => return Err(PixelateError::UnsupportedChannels(n)),
        };

        let expected = width as usize * height as usize * channel_count;
        if data.len() != expected {
            return Err(PixelateError::BufferSize {
                width,
                height,
                channels: channel_count,
                expected,
                actual: data.len(),
            });
        }

        let data = if keep == channel_count {
            data
        } else {
            data.chunks_exact(channel_count).flat_map(|px| px[..keep].iter().copied()).collect()
        };
        Ok(Self { width, height, channels, data })
    }

    /// Convert a decoded image, normalizing it to gray or RGB.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let (channels, width, height, data) = match image {
            DynamicImage::ImageLuma8(buf) => {
                let (w, h) = buf.dimensions();
                (Channels::Gray, w, h, buf.into_raw())
            }
            DynamicImage::ImageRgb8(buf) => {
                let (w, h) = buf.dimensions();
                (Channels::Rgb, w, h, buf.into_raw())
            }
            other if !other.color().has_color() => {
                let buf = other.to_luma8();
                let (w, h) = buf.dimensions();
                (Channels::Gray, w, h, buf.into_raw())
            }
            other => {
                let buf = other.to_rgb8();
                let (w, h) = buf.dimensions();
                (Channels::Rgb, w, h, buf.into_raw())
            }
        };
        Self { width, height, channels, data }
    }

    /// Convert back into an `image` crate buffer for encoding.
    pub fn to_dynamic(&self) -> Result<DynamicImage, PixelateError> {
        let size_error = || PixelateError::BufferSize {
            width: self.width,
            height: self.height,
            channels: self.channels.count(),
            expected: self.width as usize * self.height as usize * self.channels.count(),
            actual: self.data.len(),
        };
        match self.channels {
            Channels::Gray => GrayImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(size_error),
            Channels::Rgb => RgbImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(size_error),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Channel samples of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let n = self.channels.count();
        let start = self.offset(x, y);
        &self.data[start..start + n]
    }

    /// Interleaved samples of `count` consecutive pixels of row `y`, starting at column `x`.
    pub(crate) fn row_span(&self, x: u32, y: u32, count: u32) -> &[u8] {
        let start = self.offset(x, y);
        &self.data[start..start + count as usize * self.channels.count()]
    }

    /// Restrict a block to the part that lies inside this buffer.
    ///
    /// Blocks hanging off the right or bottom edge are shortened; blocks
    /// entirely outside come back with zero area.
    pub fn clip(&self, block: Block) -> Block {
        let x = block.x.min(self.width);
        let y = block.y.min(self.height);
        Block {
            x,
            y,
            width: block.width.min(self.width - x),
            height: block.height.min(self.height - y),
        }
    }

    /// Paint every pixel of `block` (clipped to the buffer) with `color`.
    ///
    /// `color` must hold at least as many samples as the buffer has channels.
    pub fn fill_rect(&mut self, block: Block, color: &[u8]) {
        let block = self.clip(block);
        let n = self.channels.count();
        let color = &color[..n];
        for y in block.y..block.y + block.height {
            let start = self.offset(block.x, y);
            let end = start + block.width as usize * n;
            for px in self.data[start..end].chunks_exact_mut(n) {
                px.copy_from_slice(color);
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, LumaA, Rgba, RgbaImage};

    #[test]
    fn test_new_rejects_wrong_length() {
        let result = PixelBuffer::new(2, 2, Channels::Rgb, vec![0; 11]);
        assert!(matches!(result, Err(PixelateError::BufferSize { expected: 12, actual: 11, .. })));
    }

    #[test]
    fn test_from_interleaved_drops_alpha() {
        let data = vec![10, 20, 30, 255, 40, 50, 60, 0];
        let buf = PixelBuffer::from_interleaved(2, 1, 4, data).expect("rgba should normalize");
        assert_eq!(buf.channels(), Channels::Rgb);
        assert_eq!(buf.as_raw(), &[10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_from_interleaved_gray_alpha() {
        let buf = PixelBuffer::from_interleaved(2, 1, 2, vec![7, 1, 9, 2])
            .expect("gray+alpha should normalize");
        assert_eq!(buf.channels(), Channels::Gray);
        assert_eq!(buf.as_raw(), &[7, 9]);
    }

    #[test]
    fn test_from_interleaved_rejects_five_channels() {
        let result = PixelBuffer::from_interleaved(1, 1, 5, vec![0; 5]);
        assert!(matches!(result, Err(PixelateError::UnsupportedChannels(5))));
    }

    #[test]
    fn test_from_dynamic_rgba_becomes_rgb() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
        let buf = PixelBuffer::from_dynamic(DynamicImage::ImageRgba8(img));
        assert_eq!(buf.channels(), Channels::Rgb);
        assert_eq!(buf.dimensions(), (3, 2));
        assert_eq!(buf.pixel(2, 1), &[1, 2, 3]);
    }

    #[test]
    fn test_from_dynamic_gray_alpha_becomes_gray() {
        let img = GrayAlphaImage::from_pixel(2, 2, LumaA([77, 10]));
        let buf = PixelBuffer::from_dynamic(DynamicImage::ImageLumaA8(img));
        assert_eq!(buf.channels(), Channels::Gray);
        assert_eq!(buf.pixel(1, 1), &[77]);
    }

    #[test]
    fn test_to_dynamic_keeps_layout() {
        let buf = PixelBuffer::from_fn(4, 3, Channels::Gray, |x, y| [(x + y) as u8, 0, 0]);
        let img = buf.to_dynamic().expect("consistent buffer converts");
        assert!(matches!(img, DynamicImage::ImageLuma8(_)));
        assert_eq!(PixelBuffer::from_dynamic(img), buf);
    }

    #[test]
    fn test_clip_shortens_edge_blocks() {
        let buf = PixelBuffer::from_fn(10, 6, Channels::Gray, |_, _| [0, 0, 0]);
        let clipped = buf.clip(Block::new(8, 4, 4, 4));
        assert_eq!(clipped, Block::new(8, 4, 2, 2));
        assert!(buf.clip(Block::new(12, 0, 4, 4)).is_empty());
    }

    #[test]
    fn test_fill_rect_only_touches_block() {
        let mut buf = PixelBuffer::from_fn(4, 4, Channels::Rgb, |_, _| [0, 0, 0]);
        buf.fill_rect(Block::new(1, 1, 2, 2), &[9, 8, 7]);
        assert_eq!(buf.pixel(1, 1), &[9, 8, 7]);
        assert_eq!(buf.pixel(2, 2), &[9, 8, 7]);
        assert_eq!(buf.pixel(0, 0), &[0, 0, 0]);
        assert_eq!(buf.pixel(3, 2), &[0, 0, 0]);
    }
}
