//! Sprite output encoders.
//!
//! Every format writes a data file; the table formats also write a TAB file
//! of fixed-size records. All checks run before any output file is created.

mod huge;
mod pack;
mod raw;
mod small;
mod table;
mod tiled;
mod writer;

pub use huge::encode_huge;
pub use pack::{pack_bits, pack_huge_row, pack_small_row, END_OF_IMAGE, END_OF_ROW, RUN_LIMIT};
pub use raw::{encode_bmp, encode_packed, encode_raw, padded_len, BMP_HEADER_LEN, BMP_PALETTE_LEN};
pub use small::{encode_jonty, encode_small};
pub use table::{SpriteEntry, TableLayout};
pub use tiled::{assemble, TileLayout, TiledRaster};
pub use writer::SpriteWriter;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, SprError};
use crate::types::{IndexedImage, Palette};

/// Output container selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpriteFormat {
    #[default]
    Raw,
    Bmp,
    HugeSprite,
    SmallSpriteV1,
    SmallSpriteV2,
    JontySpriteV1,
    JontySpriteV2,
}

impl SpriteFormat {
    pub const ALL: [SpriteFormat; 7] = [
        SpriteFormat::Raw,
        SpriteFormat::Bmp,
        SpriteFormat::HugeSprite,
        SpriteFormat::SmallSpriteV1,
        SpriteFormat::SmallSpriteV2,
        SpriteFormat::JontySpriteV1,
        SpriteFormat::JontySpriteV2,
    ];

    /// Short name used on the command line and in manifests.
    pub fn name(self) -> &'static str {
        match self {
            SpriteFormat::Raw => "RAW",
            SpriteFormat::Bmp => "BMP",
            SpriteFormat::HugeSprite => "HSPR",
            SpriteFormat::SmallSpriteV1 => "SSPR",
            SpriteFormat::SmallSpriteV2 => "SSPR2",
            SpriteFormat::JontySpriteV1 => "JSPR",
            SpriteFormat::JontySpriteV2 => "JSPR2",
        }
    }

    /// Extension of the data file when no output name is given.
    pub fn data_extension(self) -> &'static str {
        match self {
            SpriteFormat::Raw => "raw",
            SpriteFormat::Bmp => "bmp",
            SpriteFormat::HugeSprite | SpriteFormat::SmallSpriteV1 | SpriteFormat::SmallSpriteV2 => {
                "dat"
            }
            SpriteFormat::JontySpriteV1 | SpriteFormat::JontySpriteV2 => "jty",
        }
    }

    /// Record layout of the companion TAB file, if the format has one.
    pub fn table_layout(self) -> Option<TableLayout> {
        match self {
            SpriteFormat::SmallSpriteV1 => Some(TableLayout::SmallV1),
            SpriteFormat::SmallSpriteV2 => Some(TableLayout::SmallV2),
            SpriteFormat::JontySpriteV1 => Some(TableLayout::JontyV1),
            SpriteFormat::JontySpriteV2 => Some(TableLayout::JontyV2),
            _ => None,
        }
    }

    /// Whether images need animation frame metadata before encoding.
    pub fn needs_frame_data(self) -> bool {
        matches!(
            self,
            SpriteFormat::JontySpriteV1 | SpriteFormat::JontySpriteV2
        )
    }

    pub fn single_image_only(self) -> bool {
        self == SpriteFormat::HugeSprite
    }
}

impl FromStr for SpriteFormat {
    type Err = SprError;

    fn from_str(s: &str) -> Result<Self> {
        SpriteFormat::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SprError::BadFormat {
                message: format!("Unknown output format '{}'", s),
                help: Some("Use one of RAW, BMP, HSPR, SSPR, SSPR2, JSPR, JSPR2".to_string()),
            })
    }
}

impl fmt::Display for SpriteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the encoders write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub data: PathBuf,
    pub table: PathBuf,
}

impl OutputPaths {
    /// Derive both paths from an input file name and the chosen format.
    ///
    /// The data file lands in the working directory, named after the input.
    pub fn for_input(input: &Path, format: SpriteFormat) -> Self {
        let name = input.file_name().map(PathBuf::from).unwrap_or_default();
        Self::for_data(name.with_extension(format.data_extension()))
    }

    /// Table path next to an explicit data path.
    pub fn for_data(data: PathBuf) -> Self {
        let table = data.with_extension("tab");
        Self { data, table }
    }
}

fn check_batch(format: SpriteFormat, images: &[IndexedImage], tiles: Option<TileLayout>) -> Result<()> {
    if images.is_empty() {
        return Err(SprError::bad_format("No images to save"));
    }
    if format.single_image_only() && images.len() > 1 {
        return Err(SprError::LimitExceeded {
            message: format!("{} stores a single image, got {}", format, images.len()),
            help: Some("Use SSPR or JSPR for multiple sprites".to_string()),
        });
    }
    if matches!(format, SpriteFormat::Raw | SpriteFormat::Bmp) {
        match tiles {
            Some(layout) => layout.check(images)?,
            None if images.len() > 1 => {
                return Err(SprError::BadFormat {
                    message: format!("{} output of {} images needs a tile layout", format, images.len()),
                    help: Some("Pass the images through a list file whose first line gives the tile grid".to_string()),
                })
            }
            None => {}
        }
    }
    if let Some(layout) = format.table_layout() {
        // Sizes are checked up front so a too-large sprite fails before any file exists.
        let mut scratch = Vec::with_capacity(layout.record_size());
        for image in images {
            scratch.clear();
            let (width, height) = match (format.needs_frame_data(), image.frame) {
                (true, Some(frame)) => (frame.s_width, frame.s_height),
                _ => (image.width, image.height),
            };
            let entry = SpriteEntry {
                offset: 0,
                width,
                height,
                frame: image.frame,
            };
            layout.encode_record(&entry, &mut scratch)?;
        }
    }
    Ok(())
}

/// Encode `images` in `format` and write the data (and table) files.
///
/// Returns the table entries written, or the single HugeSprite entry.
pub fn save_sprites(
    format: SpriteFormat,
    images: &[IndexedImage],
    palette: &Palette,
    paths: &OutputPaths,
    tiles: Option<TileLayout>,
) -> Result<Vec<SpriteEntry>> {
    check_batch(format, images, tiles)?;

    let mut out = SpriteWriter::create(&paths.data)?;
    let entries = match format {
        SpriteFormat::Raw => {
            let bits = palette.bits_per_pixel();
            match tiles {
                Some(layout) => {
                    let raster = assemble(images, layout, bits)?;
                    encode_packed(&mut out, raster.rows.iter().map(Vec::as_slice))?;
                }
                None => {
                    let image = &images[0];
                    encode_raw(&mut out, (0..image.height).map(|y| image.row(y)), bits)?;
                }
            }
            Vec::new()
        }
        SpriteFormat::Bmp => {
            match tiles {
                Some(layout) => {
                    let raster = assemble(images, layout, 8)?;
                    encode_bmp(
                        &mut out,
                        palette,
                        raster.width,
                        raster.rows.iter().map(Vec::as_slice),
                    )?;
                }
                None => {
                    let image = &images[0];
                    encode_bmp(
                        &mut out,
                        palette,
                        image.width,
                        (0..image.height).map(|y| image.row(y)),
                    )?;
                }
            }
            Vec::new()
        }
        SpriteFormat::HugeSprite => vec![encode_huge(&mut out, &images[0])?],
        SpriteFormat::SmallSpriteV1 | SpriteFormat::SmallSpriteV2 => encode_small(&mut out, images)?,
        SpriteFormat::JontySpriteV1 | SpriteFormat::JontySpriteV2 => encode_jonty(&mut out, images)?,
    };
    out.finish()?;

    if let Some(layout) = format.table_layout() {
        let bytes = layout.encode_table(&entries)?;
        let mut tab = SpriteWriter::create(&paths.table)?;
        tab.write_bytes(&bytes)?;
        tab.finish()?;
    }

    Ok(entries)
}

#[derive(Serialize)]
struct TableRow<'a> {
    index: usize,
    #[serde(flatten)]
    entry: &'a SpriteEntry,
}

/// Render table entries as pretty-printed JSON.
pub fn table_json(entries: &[SpriteEntry]) -> Result<String> {
    let rows: Vec<TableRow> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| TableRow { index, entry })
        .collect();
    serde_json::to_string_pretty(&rows)
        .map_err(|e| SprError::bad_format(format!("Cannot serialize table: {}", e)))
}

/// Write the JSON table dump to `path`.
pub fn write_table_json(path: &Path, entries: &[SpriteEntry]) -> Result<()> {
    let json = table_json(entries)?;
    std::fs::write(path, json + "\n").map_err(|e| SprError::WriteFailure {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Colour, EdgeMargins, FrameData};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn palette() -> Palette {
        Palette::new(vec![
            Colour::BLACK,
            Colour::WHITE,
            Colour::rgb(255, 0, 0),
            Colour::rgb(0, 255, 0),
        ])
        .unwrap()
    }

    fn opaque(width: u32, height: u32, value: u8) -> IndexedImage {
        let cells = (width * height) as usize;
        IndexedImage::new(width, height, vec![value; cells], vec![false; cells]).unwrap()
    }

    fn paths(dir: &Path, name: &str) -> OutputPaths {
        OutputPaths::for_data(dir.join(name))
    }

    #[test]
    fn test_format_names() {
        assert_eq!("sspr2".parse::<SpriteFormat>().unwrap(), SpriteFormat::SmallSpriteV2);
        assert_eq!("Hspr".parse::<SpriteFormat>().unwrap(), SpriteFormat::HugeSprite);
        assert!("png".parse::<SpriteFormat>().is_err());
        for format in SpriteFormat::ALL {
            assert_eq!(format.name().parse::<SpriteFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_default_output_paths() {
        let p = OutputPaths::for_input(Path::new("art/hero.png"), SpriteFormat::JontySpriteV1);
        assert_eq!(p.data, PathBuf::from("hero.jty"));
        assert_eq!(p.table, PathBuf::from("hero.tab"));
        let p = OutputPaths::for_input(Path::new("hero.png"), SpriteFormat::SmallSpriteV1);
        assert_eq!(p.data, PathBuf::from("hero.dat"));
    }

    #[test]
    fn test_save_small_v1_writes_data_and_table() {
        let dir = tempdir().unwrap();
        let out = paths(dir.path(), "sprites.dat");
        let entries = save_sprites(
            SpriteFormat::SmallSpriteV1,
            &[opaque(4, 4, 1)],
            &palette(),
            &out,
            None,
        )
        .unwrap();
        assert_eq!(entries.len(), 2);

        let data = std::fs::read(&out.data).unwrap();
        assert_eq!(&data[..2], &[2, 0]);
        assert_eq!(&data[2..8], &[4, 1, 1, 1, 1, 0]);
        assert_eq!(data.last(), Some(&0x80));

        let tab = std::fs::read(&out.table).unwrap();
        assert_eq!(tab, vec![0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 4, 4]);
    }

    #[test]
    fn test_save_jonty_v2_table_has_trailing_sentinel() {
        let dir = tempdir().unwrap();
        let out = paths(dir.path(), "anim.jty");
        let mut image = opaque(2, 2, 3);
        image.frame = Some(FrameData::from_margins(2, 2, EdgeMargins::default(), [0, 1, 0, 0]).unwrap());
        let entries = save_sprites(
            SpriteFormat::JontySpriteV2,
            &[image],
            &palette(),
            &out,
            None,
        )
        .unwrap();
        let data_len = std::fs::read(&out.data).unwrap().len() as u32;
        assert_eq!(entries.last().unwrap().offset, data_len);

        let tab = std::fs::read(&out.table).unwrap();
        assert_eq!(tab.len(), 2 * TableLayout::JontyV2.record_size());
    }

    #[test]
    fn test_save_bmp_scenario() {
        let dir = tempdir().unwrap();
        let out = paths(dir.path(), "tile.bmp");
        let two = Palette::new(vec![Colour::BLACK, Colour::WHITE]).unwrap();
        save_sprites(SpriteFormat::Bmp, &[opaque(2, 2, 1)], &two, &out, None).unwrap();
        let bytes = std::fs::read(&out.data).unwrap();
        assert_eq!(&bytes[..2], b"BM");
        assert_eq!(bytes.len(), 0x36 + 1024 + 8);
        assert_eq!(
            u32::from_le_bytes(bytes[0x0A..0x0E].try_into().unwrap()),
            0x36 + 1024
        );
        assert!(!out.table.exists());
    }

    #[test]
    fn test_save_raw_tiled() {
        let dir = tempdir().unwrap();
        let out = paths(dir.path(), "tiles.raw");
        let layout = TileLayout::from_fields([2, 0, 2, 1]).unwrap();
        save_sprites(
            SpriteFormat::Raw,
            &[opaque(2, 1, 1), opaque(2, 1, 2)],
            &palette(),
            &out,
            Some(layout),
        )
        .unwrap();
        // each tile row packs to its own byte at 2 bits per pixel, then pads to 4 bytes
        assert_eq!(
            std::fs::read(&out.data).unwrap(),
            vec![0b0101_0000, 0b1010_0000, 0, 0]
        );
    }

    #[test]
    fn test_failures_leave_no_files() {
        let dir = tempdir().unwrap();
        let out = paths(dir.path(), "huge.dat");
        let err = save_sprites(
            SpriteFormat::HugeSprite,
            &[opaque(1, 1, 0), opaque(1, 1, 0)],
            &palette(),
            &out,
            None,
        );
        assert!(matches!(err, Err(SprError::LimitExceeded { .. })));
        assert!(!out.data.exists());

        let out = paths(dir.path(), "wide.dat");
        let err = save_sprites(
            SpriteFormat::SmallSpriteV1,
            &[opaque(300, 1, 0)],
            &palette(),
            &out,
            None,
        );
        assert!(matches!(err, Err(SprError::LimitExceeded { .. })));
        assert!(!out.data.exists());

        let out = paths(dir.path(), "many.raw");
        let err = save_sprites(
            SpriteFormat::Raw,
            &[opaque(1, 1, 0), opaque(1, 1, 0)],
            &palette(),
            &out,
            None,
        );
        assert!(matches!(err, Err(SprError::BadFormat { .. })));
        assert!(!out.data.exists());
    }

    #[test]
    fn test_table_json_snapshot() {
        let entries = vec![
            SpriteEntry::sentinel(0),
            SpriteEntry {
                offset: 2,
                width: 4,
                height: 4,
                frame: None,
            },
        ];
        insta::assert_snapshot!(table_json(&entries).unwrap(), @r###"
        [
          {
            "index": 0,
            "offset": 0,
            "width": 0,
            "height": 0
          },
          {
            "index": 1,
            "offset": 2,
            "width": 4,
            "height": 4
          }
        ]
        "###);
    }
}
