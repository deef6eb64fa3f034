//! Flat RAW and 8-bit BMP output.

use std::io::{Seek, Write};

use crate::error::{Result, SprError};
use crate::types::Palette;

use super::pack::pack_bits;
use super::SpriteWriter;

/// Size of the BMP file and info headers.
pub const BMP_HEADER_LEN: u32 = 0x36;

/// Size of the BMP colour table: 256 BGR0 quads.
pub const BMP_PALETTE_LEN: u32 = 256 * 4;

/// Round a row length up to a 4-byte boundary.
pub fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

fn write_padded<W: Write + Seek>(out: &mut SpriteWriter<W>, row: &[u8]) -> Result<()> {
    out.write_bytes(row)?;
    let padding = padded_len(row.len()) - row.len();
    out.write_bytes(&[0u8; 3][..padding])
}

/// Write rows of palette indices packed to `bits` per pixel, each padded to 4 bytes.
pub fn encode_raw<'r, W, I>(out: &mut SpriteWriter<W>, rows: I, bits: u8) -> Result<()>
where
    W: Write + Seek,
    I: IntoIterator<Item = &'r [u8]>,
{
    for row in rows {
        write_padded(out, &pack_bits(row, bits))?;
    }
    Ok(())
}

/// Write already packed rows, each padded to 4 bytes.
pub fn encode_packed<'r, W, I>(out: &mut SpriteWriter<W>, rows: I) -> Result<()>
where
    W: Write + Seek,
    I: IntoIterator<Item = &'r [u8]>,
{
    for row in rows {
        write_padded(out, row)?;
    }
    Ok(())
}

/// Write a top-down 8-bit indexed BMP.
///
/// The header is written as zeros first and filled in once the pixel data is
/// out, followed by the palette padded to 256 entries.
pub fn encode_bmp<'r, W, I>(
    out: &mut SpriteWriter<W>,
    palette: &Palette,
    width: u32,
    rows: I,
) -> Result<()>
where
    W: Write + Seek,
    I: IntoIterator<Item = &'r [u8]>,
{
    let start = out.position()?;
    out.write_bytes(&[0u8; BMP_HEADER_LEN as usize])?;

    let mut table = Vec::with_capacity(BMP_PALETTE_LEN as usize);
    for colour in palette.colours() {
        table.extend_from_slice(&[colour.b, colour.g, colour.r, 0]);
    }
    table.resize(BMP_PALETTE_LEN as usize, 0);
    out.write_bytes(&table)?;

    let mut height = 0u32;
    for row in rows {
        write_padded(out, row)?;
        height += 1;
    }
    let end = out.position()?;

    let stride = padded_len(width as usize) as u64;
    let data_len = u32::try_from(stride * height as u64)
        .map_err(|_| SprError::limit(format!("BMP of {}x{} is too large", width, height)))?;
    let signed_width = i32::try_from(width)
        .map_err(|_| SprError::limit(format!("BMP width {} is too large", width)))?;

    out.seek_to(start)?;
    out.write_bytes(b"BM")?;
    out.write_u32(BMP_HEADER_LEN + BMP_PALETTE_LEN + data_len)?;
    out.write_u32(0)?;
    out.write_u32(BMP_HEADER_LEN + BMP_PALETTE_LEN)?;
    out.write_u32(40)?;
    out.write_i32(signed_width)?;
    out.write_i32(-(height as i32))?;
    out.write_u16(1)?;
    out.write_u16(8)?;
    out.seek_to(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn memory() -> SpriteWriter<Cursor<Vec<u8>>> {
        SpriteWriter::new(Cursor::new(Vec::new()), "mem")
    }

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    fn i32_at(bytes: &[u8], at: usize) -> i32 {
        i32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 4);
        assert_eq!(padded_len(4), 4);
        assert_eq!(padded_len(5), 8);
    }

    #[test]
    fn test_raw_rows_are_padded() {
        let mut out = memory();
        let rows: [&[u8]; 2] = [&[1, 2, 3], &[4, 5, 6]];
        encode_raw(&mut out, rows, 8).unwrap();
        let bytes = out.finish().unwrap().into_inner();
        assert_eq!(bytes, vec![1, 2, 3, 0, 4, 5, 6, 0]);
    }

    #[test]
    fn test_raw_rows_bit_packed() {
        let mut out = memory();
        let rows: [&[u8]; 1] = [&[1, 0, 1, 0, 1, 0, 1, 0, 1]];
        encode_raw(&mut out, rows, 1).unwrap();
        let bytes = out.finish().unwrap().into_inner();
        assert_eq!(bytes, vec![0b1010_1010, 0b1000_0000, 0, 0]);
    }

    #[test]
    fn test_bmp_two_by_two() {
        let palette = Palette::new(vec![Colour::rgb(1, 2, 3), Colour::WHITE]).unwrap();
        let mut out = memory();
        let rows: [&[u8]; 2] = [&[0, 1], &[1, 0]];
        encode_bmp(&mut out, &palette, 2, rows).unwrap();
        let bytes = out.finish().unwrap().into_inner();

        let data_offset = 0x36 + 1024;
        assert_eq!(bytes.len(), data_offset + 8);
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(u32_at(&bytes, 2), (data_offset + 8) as u32);
        assert_eq!(u32_at(&bytes, 0x0A), data_offset as u32);
        assert_eq!(u32_at(&bytes, 0x0E), 40);
        assert_eq!(i32_at(&bytes, 0x12), 2);
        assert_eq!(i32_at(&bytes, 0x16), -2);
        assert_eq!(&bytes[0x1A..0x1E], &[1, 0, 8, 0]);

        // palette in BGR0 order, padded with zeros
        assert_eq!(&bytes[0x36..0x3E], &[3, 2, 1, 0, 255, 255, 255, 0]);
        assert!(bytes[0x3E..data_offset].iter().all(|&b| b == 0));

        // top-down rows padded to 4 bytes
        assert_eq!(&bytes[data_offset..], &[0, 1, 0, 0, 1, 0, 0, 0]);
    }
}
