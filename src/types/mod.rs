//! Core domain types for palspr.
//!
//! This module contains the fundamental types used throughout the pipeline:
//! - `Colour` - RGB colour values
//! - `Palette` - Ordered colour table with nearest-colour search
//! - `SourceImage` / `IndexedImage` - Images before and after conversion

mod colour;
mod palette;
mod raster;

pub use colour::Colour;
pub use palette::{Palette, MAX_COLOURS};
pub use raster::{
    CropRect, CropRequest, EdgeMargins, FrameData, IndexedImage, PixelFormat, SourceImage,
};
