//! Binary palette file reader.
//!
//! A palette file is a flat run of `(r, g, b)` byte triples. Each channel is
//! stored in `0..=range` and scaled to `0..=255` on load.

use std::path::Path;

use crate::error::{Result, SprError};
use crate::types::{Colour, Palette};

/// Channel range used when none is given.
pub const DEFAULT_RANGE: u8 = 255;

/// A palette together with notes gathered while reading it.
#[derive(Debug, Clone)]
pub struct LoadedPalette {
    pub palette: Palette,
    /// Channels whose stored value exceeded `range` and were clamped to 255.
    pub clamped: usize,
    /// Bytes after the last whole triple, ignored.
    pub trailing: usize,
}

fn scale(value: u8, range: u8) -> (u8, bool) {
    let scaled = value as u32 * 255 / range as u32;
    if scaled > 255 {
        (255, true)
    } else {
        (scaled as u8, false)
    }
}

/// Decode palette bytes, requiring exactly `expected` colours.
pub fn parse_palette(bytes: &[u8], range: u8, expected: usize) -> Result<LoadedPalette> {
    if range == 0 {
        return Err(SprError::BadFormat {
            message: "Palette range must be at least 1".to_string(),
            help: Some("Pass --range with the largest channel value stored in the file".to_string()),
        });
    }

    let mut clamped = 0;
    let colours: Vec<Colour> = bytes
        .chunks_exact(3)
        .map(|triple| {
            let mut channel = |v: u8| {
                let (c, over) = scale(v, range);
                clamped += over as usize;
                c
            };
            Colour::rgb(channel(triple[0]), channel(triple[1]), channel(triple[2]))
        })
        .collect();

    if colours.len() != expected {
        return Err(SprError::BadFormat {
            message: format!(
                "Palette holds {} colours, expected {}",
                colours.len(),
                expected
            ),
            help: Some(format!(
                "A {}-colour palette file is exactly {} bytes",
                expected,
                expected * 3
            )),
        });
    }

    Ok(LoadedPalette {
        palette: Palette::new(colours)?,
        clamped,
        trailing: bytes.len() % 3,
    })
}

/// Read and decode the palette file at `path`.
pub fn read_palette(path: &Path, range: u8, expected: usize) -> Result<LoadedPalette> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => SprError::CannotOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
        _ => SprError::ReadFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;
    parse_palette(&bytes, range, expected)
}
