//! Fixed, ordered palette and nearest-colour search.

use crate::error::{Result, SprError};

use super::Colour;

/// Largest palette an 8-bit indexed sprite can address.
pub const MAX_COLOURS: usize = 256;

/// An ordered colour table; the index of an entry is its palette id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colours: Vec<Colour>,
}

impl Palette {
    /// Create a palette from its entries in order.
    ///
    /// Fails when the palette is empty or has more entries than a byte can index.
    pub fn new(colours: Vec<Colour>) -> Result<Self> {
        if colours.is_empty() {
            return Err(SprError::bad_format("Palette has no colours"));
        }
        if colours.len() > MAX_COLOURS {
            return Err(SprError::LimitExceeded {
                message: format!(
                    "Palette has {} colours, at most {} are supported",
                    colours.len(),
                    MAX_COLOURS
                ),
                help: None,
            });
        }
        Ok(Self { colours })
    }

    /// Get a colour by index.
    pub fn get(&self, index: u8) -> Option<Colour> {
        self.colours.get(index as usize).copied()
    }

    /// All entries in palette order.
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    /// Get the number of colours.
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Always false; an empty palette cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    /// Bits needed to store one index: the smallest `n >= 1` with `2^n >= len`.
    pub fn bits_per_pixel(&self) -> u8 {
        let mut bits = 1u8;
        while (1usize << bits) < self.colours.len() {
            bits += 1;
        }
        bits
    }

    /// Index of the entry closest to `colour` by squared RGB distance.
    ///
    /// Ties go to the lowest index.
    pub fn nearest(&self, colour: Colour) -> u8 {
        let mut best_index = 0usize;
        let mut best_dist = u32::MAX;

        for (i, entry) in self.colours.iter().enumerate() {
            let dist = colour.distance_sq(*entry);
            if dist < best_dist {
                best_dist = dist;
                best_index = i;
            }
        }

        best_index as u8
    }
}
