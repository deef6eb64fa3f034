//! TAB file records.
//!
//! Each layout is a fixed-size little-endian record written field by field.
//! All four start with the data offset as a `u32`.

use serde::Serialize;

use crate::error::{Result, SprError};
use crate::types::FrameData;

/// One table entry before serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpriteEntry {
    /// Offset of the sprite's data in the data file.
    pub offset: u32,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameData>,
}

impl SpriteEntry {
    /// Zero-sized entry marking an unused slot or the end of the table.
    pub const fn sentinel(offset: u32) -> Self {
        Self {
            offset,
            width: 0,
            height: 0,
            frame: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

/// Binary record layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    /// `u32` offset, `u8` width, `u8` height.
    SmallV1,
    /// `u32` offset, `u16` width, `u16` height.
    SmallV2,
    /// `u32` offset, `u8` sprite and frame sizes, `u8` rotable and frame count,
    /// `i8` frame offsets, `i16` unkn6 and unkn8.
    JontyV1,
    /// Like `JontyV1` with `u16` sizes and `i16` frame offsets.
    JontyV2,
}

fn field<T: TryFrom<u32>>(value: u32, name: &str, layout: TableLayout) -> Result<T> {
    T::try_from(value).map_err(|_| SprError::LimitExceeded {
        message: format!("{} {} does not fit a {:?} table record", name, value, layout),
        help: match layout {
            TableLayout::SmallV1 | TableLayout::JontyV1 => {
                Some("Use the version 2 format for sprites larger than 255 pixels".to_string())
            }
            _ => None,
        },
    })
}

impl TableLayout {
    /// Size of one serialized record in bytes.
    pub fn record_size(self) -> usize {
        match self {
            TableLayout::SmallV1 => 6,
            TableLayout::SmallV2 => 8,
            TableLayout::JontyV1 => 16,
            TableLayout::JontyV2 => 22,
        }
    }

    /// Append one record to `out`.
    pub fn encode_record(self, entry: &SpriteEntry, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&entry.offset.to_le_bytes());

        match self {
            TableLayout::SmallV1 => {
                out.push(field::<u8>(entry.width, "width", self)?);
                out.push(field::<u8>(entry.height, "height", self)?);
            }
            TableLayout::SmallV2 => {
                out.extend_from_slice(&field::<u16>(entry.width, "width", self)?.to_le_bytes());
                out.extend_from_slice(&field::<u16>(entry.height, "height", self)?.to_le_bytes());
            }
            TableLayout::JontyV1 => {
                let f = entry.frame.unwrap_or(sentinel_frame());
                out.push(field::<u8>(entry.width, "width", self)?);
                out.push(field::<u8>(entry.height, "height", self)?);
                out.push(field::<u8>(f.frame_width, "frame width", self)?);
                out.push(field::<u8>(f.frame_height, "frame height", self)?);
                out.push(f.rotable);
                out.push(f.frames_count);
                out.push(field::<i8>(f.frame_offs_w, "frame offset", self)? as u8);
                out.push(field::<i8>(f.frame_offs_h, "frame offset", self)? as u8);
                out.extend_from_slice(&f.unkn6.to_le_bytes());
                out.extend_from_slice(&f.unkn8.to_le_bytes());
            }
            TableLayout::JontyV2 => {
                let f = entry.frame.unwrap_or(sentinel_frame());
                for (value, name) in [
                    (entry.width, "width"),
                    (entry.height, "height"),
                    (f.frame_width, "frame width"),
                    (f.frame_height, "frame height"),
                ] {
                    out.extend_from_slice(&field::<u16>(value, name, self)?.to_le_bytes());
                }
                out.push(f.rotable);
                out.push(f.frames_count);
                out.extend_from_slice(&field::<i16>(f.frame_offs_w, "frame offset", self)?.to_le_bytes());
                out.extend_from_slice(&field::<i16>(f.frame_offs_h, "frame offset", self)?.to_le_bytes());
                out.extend_from_slice(&f.unkn6.to_le_bytes());
                out.extend_from_slice(&f.unkn8.to_le_bytes());
            }
        }

        Ok(())
    }

    /// Serialize all entries back to back with no padding.
    pub fn encode_table(self, entries: &[SpriteEntry]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(entries.len() * self.record_size());
        for entry in entries {
            self.encode_record(entry, &mut out)?;
        }
        Ok(out)
    }
}

fn sentinel_frame() -> FrameData {
    FrameData {
        s_width: 0,
        s_height: 0,
        frame_width: 0,
        frame_height: 0,
        frame_offs_w: 0,
        frame_offs_h: 0,
        rotable: 0,
        frames_count: 0,
        unkn6: 0,
        unkn8: 0,
    }
}
