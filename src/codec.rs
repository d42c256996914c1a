//! Image decoding and encoding

use std::io::Cursor;
use std::path::Path;

use clap::ValueEnum;
use image::ImageOutputFormat;
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::PixelateError;

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Encoded file formats the filter can export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    #[default]
    Jpeg,
}

impl OutputFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Decode/encode capability at the edges of the pipeline.
pub trait Codec: Send + Sync {
    /// Decode an encoded image into a gray or RGB buffer.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, PixelateError>;

    /// Encode a buffer. `quality` (1-100) only applies to JPEG.
    fn encode(
        &self,
        image: &PixelBuffer,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, PixelateError>;
}

/// [`Codec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, PixelateError> {
        let image = image::load_from_memory(bytes)?;
        Ok(PixelBuffer::from_dynamic(image))
    }

    fn encode(
        &self,
        image: &PixelBuffer,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, PixelateError> {
        let output_format = match format {
            OutputFormat::Png => ImageOutputFormat::Png,
            OutputFormat::Jpeg => ImageOutputFormat::Jpeg(quality.clamp(1, 100)),
        };
        let mut cursor = Cursor::new(Vec::new());
        image.to_dynamic()?.write_to(&mut cursor, output_format)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out.png")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("a/b.JPG")), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_path(Path::new("x.jpeg")), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_path(Path::new("x.gif")), None);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_png_is_lossless() {
        let buf = PixelBuffer::from_fn(7, 5, Channels::Rgb, |x, y| [(x * 30) as u8, (y * 50) as u8, 3]);
        let bytes = ImageCodec.encode(&buf, OutputFormat::Png, DEFAULT_JPEG_QUALITY).expect("encode");
        assert_eq!(ImageCodec.decode(&bytes).expect("decode"), buf);
    }

    #[test]
    fn test_jpeg_keeps_dimensions_and_layout() {
        let buf = PixelBuffer::from_fn(16, 8, Channels::Gray, |x, _| [(x * 16) as u8, 0, 0]);
        let bytes = ImageCodec.encode(&buf, OutputFormat::Jpeg, 90).expect("encode");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = ImageCodec.decode(&bytes).expect("decode");
        assert_eq!(decoded.dimensions(), (16, 8));
        assert_eq!(decoded.channels(), Channels::Gray);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(ImageCodec.decode(b"not an image"), Err(PixelateError::Image(_))));
    }
}
