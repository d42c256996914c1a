//! Blockpix - Adaptive quadtree pixel-art filter
//!
//! This library provides functionality to:
//! - Pixelate images with block sizes that follow local contrast
//! - Decode, blur and encode images around that filter
//! - Load filter settings from `blockpix.toml`

pub mod buffer;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod pipeline;
pub mod pixelate;

pub use buffer::{Channels, PixelBuffer};
pub use error::PixelateError;
pub use pixelate::{PixelateSettings, Pixelator, Rendering};
