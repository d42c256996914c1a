//! Input loading and end-to-end runs
//!
//! A missing or undecodable input is not an error here: loading yields `None`
//! and [`Pipeline::run`] returns `Ok(None)` ("no result"). Only failures of
//! the filter itself surface as [`PixelateError`].

use std::path::PathBuf;

use log::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::codec::{Codec, ImageCodec};
use crate::error::PixelateError;
use crate::pixelate::{Pixelator, Rendering};

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum Input {
    /// Encoded image file on disk
    Path(PathBuf),
    /// Encoded image bytes
    Bytes(Vec<u8>),
    /// Raw interleaved samples with 1 to 4 channels
    Raw { width: u32, height: u32, channels: usize, data: Vec<u8> },
    /// Already normalized buffer
    Buffer(PixelBuffer),
}

impl From<PixelBuffer> for Input {
    fn from(buffer: PixelBuffer) -> Self {
        Input::Buffer(buffer)
    }
}

/// Loads inputs and runs them through a [`Pixelator`].
pub struct Pipeline {
    pixelator: Pixelator,
    codec: Box<dyn Codec>,
}

impl Pipeline {
    pub fn new(pixelator: Pixelator) -> Self {
        Self { pixelator, codec: Box::new(ImageCodec) }
    }

    pub fn with_codec(mut self, codec: Box<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn pixelator(&self) -> &Pixelator {
        &self.pixelator
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// Turn an input into a normalized buffer, or `None` if that is not possible.
    pub fn load(&self, input: &Input) -> Option<PixelBuffer> {
        match input {
            Input::Path(path) => {
                if !path.exists() {
                    debug!("Input '{}' does not exist", path.display());
                    return None;
                }
                let bytes = match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Cannot read '{}': {}", path.display(), e);
                        return None;
                    }
                };
                self.decode(&bytes, &path.display().to_string())
            }
            Input::Bytes(bytes) => self.decode(bytes, "input bytes"),
            Input::Raw { width, height, channels, data } => {
                match PixelBuffer::from_interleaved(*width, *height, *channels, data.clone()) {
                    Ok(buffer) => Some(buffer),
                    Err(e) => {
                        warn!("Rejecting raw input: {}", e);
                        None
                    }
                }
            }
            Input::Buffer(buffer) => Some(buffer.clone()),
        }
    }

    fn decode(&self, bytes: &[u8], origin: &str) -> Option<PixelBuffer> {
        match self.codec.decode(bytes) {
            Ok(buffer) => Some(buffer),
            Err(e) => {
                warn!("Cannot decode {}: {}", origin, e);
                None
            }
        }
    }

    /// Load `input` and pixelate it.
    ///
    /// Returns `Ok(None)` when there is no input or it cannot be loaded.
    pub fn run(&self, input: Option<&Input>) -> Result<Option<Rendering>, PixelateError> {
        let Some(input) = input else {
            debug!("No input given");
            return Ok(None);
        };
        let Some(source) = self.load(input) else {
            return Ok(None);
        };
        self.pixelator.pixelate(&source).map(Some)
    }
}
