//! HugeSprite encoder.
//!
//! The file starts with one `i32` per row giving that row's offset from the end
//! of this header; the rows follow as HugeSprite runs. The header is written as
//! a placeholder first and rewritten once the offsets are known.

use std::io::{Seek, Write};

use crate::error::{Result, SprError};
use crate::types::IndexedImage;

use super::pack::pack_huge_row;
use super::table::SpriteEntry;
use super::SpriteWriter;

pub fn encode_huge<W: Write + Seek>(
    out: &mut SpriteWriter<W>,
    image: &IndexedImage,
) -> Result<SpriteEntry> {
    let header_at = out.position()?;
    out.write_bytes(&vec![0u8; image.height as usize * 4])?;
    let base = out.position()?;

    let mut offsets = Vec::with_capacity(image.height as usize);
    let mut row = Vec::new();
    for y in 0..image.height {
        let offset = out.position()? - base;
        offsets.push(
            i32::try_from(offset)
                .map_err(|_| SprError::limit(format!("Row {} offset {} exceeds i32", y, offset)))?,
        );
        row.clear();
        pack_huge_row(&mut row, image.row(y), image.transparent_row(y));
        out.write_bytes(&row)?;
    }
    let end = out.position()?;

    out.seek_to(header_at)?;
    for offset in offsets {
        out.write_i32(offset)?;
    }
    out.seek_to(end)?;

    Ok(SpriteEntry {
        offset: 0,
        width: image.width,
        height: image.height,
        frame: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_row_offsets_header() {
        let image = IndexedImage::new(
            3,
            2,
            vec![1, 2, 3, 4, 5, 6],
            vec![false, false, false, true, false, true],
        )
        .unwrap();
        let mut out = SpriteWriter::new(Cursor::new(Vec::new()), "mem");
        let entry = encode_huge(&mut out, &image).unwrap();
        assert_eq!((entry.width, entry.height), (3, 2));
        let bytes = out.finish().unwrap().into_inner();

        let mut expected = Vec::new();
        // header: row 0 at 0, row 1 after 4 + 3 + 4 bytes
        expected.extend_from_slice(&0i32.to_le_bytes());
        expected.extend_from_slice(&11i32.to_le_bytes());
        // row 0: 3 opaque, 0 transparent
        expected.extend_from_slice(&3i32.to_le_bytes());
        expected.extend_from_slice(&[1, 2, 3]);
        expected.extend_from_slice(&0i32.to_le_bytes());
        // row 1: 0 opaque, 1 transparent, 1 opaque, 1 transparent
        expected.extend_from_slice(&0i32.to_le_bytes());
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(&[5]);
        expected.extend_from_slice(&1i32.to_le_bytes());
        assert_eq!(bytes, expected);
    }
}
