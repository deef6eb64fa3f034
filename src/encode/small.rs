//! SmallSprite and JontySprite data encoders.
//!
//! Both store every image as SmallSprite rows followed by `END_OF_IMAGE`, and
//! return the table entries describing where each image starts.

use std::io::{Seek, Write};

use crate::error::{Result, SprError};
use crate::types::{FrameData, IndexedImage};

use super::pack::{pack_small_row, END_OF_IMAGE};
use super::table::SpriteEntry;
use super::SpriteWriter;

fn data_offset<W: Write + Seek>(out: &mut SpriteWriter<W>, base: u64) -> Result<u32> {
    let offset = out.position()? - base;
    u32::try_from(offset)
        .map_err(|_| SprError::limit(format!("Data offset {} exceeds 32 bits", offset)))
}

/// Pack the `width` x `height` block at (`x`, `y`) of `image`.
fn write_block<W: Write + Seek>(
    out: &mut SpriteWriter<W>,
    image: &IndexedImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<()> {
    let (x0, x1) = (x as usize, (x + width) as usize);
    let mut row = Vec::with_capacity(width as usize * 2 + 1);
    for line in y..y + height {
        row.clear();
        pack_small_row(
            &mut row,
            &image.row(line)[x0..x1],
            &image.transparent_row(line)[x0..x1],
        );
        out.write_bytes(&row)?;
    }
    out.write_bytes(&[END_OF_IMAGE])
}

/// Write SmallSprite data.
///
/// The file starts with a `u16` holding the entry count (images plus one);
/// offsets are measured from the start of the file. Entry 0 is an unused
/// sentinel, so the returned table has `images.len() + 1` entries.
pub fn encode_small<W: Write + Seek>(
    out: &mut SpriteWriter<W>,
    images: &[IndexedImage],
) -> Result<Vec<SpriteEntry>> {
    let count = u16::try_from(images.len() + 1)
        .map_err(|_| SprError::limit(format!("{} sprites do not fit a SmallSprite file", images.len())))?;

    let base = out.position()?;
    out.write_u16(count)?;

    let mut entries = Vec::with_capacity(images.len() + 1);
    entries.push(SpriteEntry::sentinel(0));
    for image in images {
        let offset = data_offset(out, base)?;
        write_block(out, image, 0, 0, image.width, image.height)?;
        entries.push(SpriteEntry {
            offset,
            width: image.width,
            height: image.height,
            frame: None,
        });
    }
    Ok(entries)
}

fn frame_of(image: &IndexedImage, index: usize) -> Result<FrameData> {
    let frame = image.frame.ok_or_else(|| SprError::BadFormat {
        message: format!("Image {} has no animation frame data", index),
        help: Some("JontySprite output needs frame data computed while loading".to_string()),
    })?;
    let fits = |offset: u32, size: u32, extent: u32| offset as u64 + size as u64 <= extent as u64;
    if !fits(frame.frame_offs_w, frame.s_width, image.width)
        || !fits(frame.frame_offs_h, frame.s_height, image.height)
    {
        return Err(SprError::bad_format(format!(
            "Frame of image {} ({}x{} at {},{}) lies outside its {}x{} bounds",
            index,
            frame.s_width,
            frame.s_height,
            frame.frame_offs_w,
            frame.frame_offs_h,
            image.width,
            image.height
        )));
    }
    Ok(frame)
}

/// Write JontySprite data.
///
/// There is no header. Each image contributes only its visible sub-rectangle
/// from the frame data. Entries are numbered from 0 and a trailing sentinel
/// records the end offset.
pub fn encode_jonty<W: Write + Seek>(
    out: &mut SpriteWriter<W>,
    images: &[IndexedImage],
) -> Result<Vec<SpriteEntry>> {
    let frames = images
        .iter()
        .enumerate()
        .map(|(i, image)| frame_of(image, i))
        .collect::<Result<Vec<_>>>()?;

    let base = out.position()?;
    let mut entries = Vec::with_capacity(images.len() + 1);
    for (image, frame) in images.iter().zip(frames) {
        let offset = data_offset(out, base)?;
        write_block(
            out,
            image,
            frame.frame_offs_w,
            frame.frame_offs_h,
            frame.s_width,
            frame.s_height,
        )?;
        entries.push(SpriteEntry {
            offset,
            width: frame.s_width,
            height: frame.s_height,
            frame: Some(frame),
        });
    }
    entries.push(SpriteEntry::sentinel(data_offset(out, base)?));
    Ok(entries)
}
