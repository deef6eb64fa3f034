//! Readers for the converter's input side files.
//!
//! - palette files: binary RGB triples
//! - image lists and animation lists: whitespace separated text

pub mod list;
pub mod palette;

pub use list::{load_animation_list, load_image_list, parse_image_list, ImageList, InputEntry};
pub use palette::{parse_palette, read_palette, LoadedPalette, DEFAULT_RANGE};
