//! palspr - Palette-indexed sprite converter
//!
//! A library for turning truecolor images into palette-indexed sprite data
//! and lookup tables for legacy game engines: error-diffusion dithering
//! against a fixed palette, then one of several run-length or flat layouts.

pub mod cli;
pub mod context;
pub mod decode;
pub mod dither;
pub mod encode;
pub mod error;
pub mod manifest;
pub mod output;
pub mod parser;
pub mod transparency;
pub mod types;

pub use context::{ConversionContext, Diagnostic, Severity};
pub use decode::load_source_image;
pub use dither::{DiffusionKernel, DitherEngine, LevelCurve};
pub use encode::{save_sprites, OutputPaths, SpriteEntry, SpriteFormat, TableLayout, TileLayout};
pub use error::{Result, SprError, Stage, StageError};
pub use manifest::Manifest;
pub use parser::{read_palette, ImageList, InputEntry};
pub use transparency::{auto_crop, edge_margins, TransparencyCheck};
pub use types::{Colour, CropRect, CropRequest, FrameData, IndexedImage, Palette, PixelFormat, SourceImage};
