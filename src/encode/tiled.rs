//! Tile assembly for batch RAW and BMP output.
//!
//! Equally sized images are laid out left to right, `tiles_per_row` per row of
//! tiles, and merged into one raster.

use crate::error::{Result, SprError};
use crate::types::IndexedImage;

use super::pack::pack_bits;

/// Grid geometry for tiled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    pub tiles_per_row: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl TileLayout {
    /// Read the layout from list-file format fields: tiles per row, (unused),
    /// tile width, tile height.
    pub fn from_fields(fields: [i32; 4]) -> Result<Self> {
        let [per_row, _, width, height] = fields;
        if per_row <= 0 || width <= 0 || height <= 0 {
            return Err(SprError::BadFormat {
                message: format!(
                    "Invalid tile layout: {} per row, {}x{} tiles",
                    per_row, width, height
                ),
                help: Some(
                    "The first line of the list needs: name tiles_per_row 0 tile_width tile_height"
                        .to_string(),
                ),
            });
        }
        Ok(Self {
            tiles_per_row: per_row as u32,
            tile_width: width as u32,
            tile_height: height as u32,
        })
    }

    /// Ensure `images` fill whole rows of tiles and all have the tile size.
    pub fn check(&self, images: &[IndexedImage]) -> Result<()> {
        if images.is_empty() || images.len() % self.tiles_per_row as usize != 0 {
            return Err(SprError::BadFormat {
                message: format!(
                    "{} images do not completely fill rows of {} tiles",
                    images.len(),
                    self.tiles_per_row
                ),
                help: None,
            });
        }
        for (i, image) in images.iter().enumerate() {
            if image.width != self.tile_width || image.height != self.tile_height {
                return Err(SprError::bad_format(format!(
                    "Image {} is {}x{}, tiles are {}x{}",
                    i, image.width, image.height, self.tile_width, self.tile_height
                )));
            }
        }
        Ok(())
    }

    /// Pixel size of the merged raster for `count` images.
    pub fn raster_size(&self, count: usize) -> (u32, u32) {
        let rows = count as u32 / self.tiles_per_row;
        (
            self.tiles_per_row * self.tile_width,
            rows * self.tile_height,
        )
    }
}

/// Merged rows of a tiled raster, packed but not padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiledRaster {
    pub width: u32,
    pub height: u32,
    pub rows: Vec<Vec<u8>>,
}

/// Merge `images` into one raster, bit-packing each tile's row on its own.
pub fn assemble(images: &[IndexedImage], layout: TileLayout, bits: u8) -> Result<TiledRaster> {
    layout.check(images)?;
    let (width, height) = layout.raster_size(images.len());

    let mut rows = Vec::with_capacity(height as usize);
    for tile_row in images.chunks(layout.tiles_per_row as usize) {
        for y in 0..layout.tile_height {
            let mut row = Vec::new();
            for tile in tile_row {
                row.extend(pack_bits(tile.row(y), bits));
            }
            rows.push(row);
        }
    }

    Ok(TiledRaster {
        width,
        height,
        rows,
    })
}
