//! Image list and animation list readers.
//!
//! An image list starts with a header line `name fd0 fd1 fd2 fd3` whose four
//! integers are format fields (tile grid for RAW/BMP, animation flags for
//! JontySprite). Every following non-empty line is `file x y w h`; missing
//! crop values mean "whole image". File names are relative to the list.
//!
//! An animation list names one image list per line; the line's position is
//! the animation index of every image in that list.

use std::path::{Path, PathBuf};

use crate::error::{Result, SprError};
use crate::types::CropRequest;

/// One image to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEntry {
    pub path: PathBuf,
    pub crop: CropRequest,
    /// Format fields from the list header; zero for plain command-line inputs.
    pub fields: [i32; 4],
    pub animation: Option<usize>,
}

impl InputEntry {
    /// A whole-image entry for a path given directly on the command line.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            crop: CropRequest::FULL,
            fields: [0; 4],
            animation: None,
        }
    }
}

/// Parsed content of an image or animation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageList {
    /// Name from the header line of each image list, in order.
    pub names: Vec<String>,
    pub entries: Vec<InputEntry>,
    /// Non-fatal notes about the list contents.
    pub notes: Vec<String>,
}

fn parse_ints<'a>(
    tokens: impl Iterator<Item = &'a str>,
    defaults: i32,
    line: usize,
    source: &Path,
) -> Result<([i32; 4], usize)> {
    let mut values = [defaults; 4];
    let mut found = 0;
    for token in tokens {
        if found == values.len() {
            break;
        }
        values[found] = token.parse().map_err(|_| SprError::BadFormat {
            message: format!(
                "{}:{}: expected an integer, found '{}'",
                source.display(),
                line,
                token
            ),
            help: Some("List lines are: file x y w h".to_string()),
        })?;
        found += 1;
    }
    Ok((values, found))
}

/// Parse image list text. `base` is the directory file names are relative to;
/// `source` is used only in messages.
pub fn parse_image_list(
    text: &str,
    base: &Path,
    source: &Path,
    animation: Option<usize>,
) -> Result<ImageList> {
    let mut lines = text.lines().enumerate();
    let mut list = ImageList::default();

    let (name, fields) = match lines.next() {
        Some((_, header)) => {
            let mut tokens = header.split_whitespace();
            let name = tokens.next().unwrap_or_default().to_string();
            let (fields, _) = parse_ints(tokens, 0, 1, source)?;
            (name, fields)
        }
        None => (String::new(), [0; 4]),
    };
    list.names.push(name);

    for (index, line) in lines {
        let mut tokens = line.split_whitespace();
        let Some(file) = tokens.next() else {
            continue;
        };
        let (crop, found) = parse_ints(tokens, -1, index + 1, source)?;
        if found > 0 && found < 4 {
            list.notes.push(format!(
                "{}:{}: {} of 4 crop values given, the rest use the whole image",
                source.display(),
                index + 1,
                found
            ));
        }
        list.entries.push(InputEntry {
            path: base.join(file),
            crop: CropRequest {
                x: crop[0],
                y: crop[1],
                w: crop[2],
                h: crop[3],
            },
            fields,
            animation,
        });
    }

    Ok(list)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| SprError::CannotOpen {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn list_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Read an image list file.
pub fn load_image_list(path: &Path) -> Result<ImageList> {
    let text = read_text(path)?;
    parse_image_list(&text, list_dir(path), path, None)
}

/// Read an animation list and every image list it names.
pub fn load_animation_list(path: &Path) -> Result<ImageList> {
    let text = read_text(path)?;
    let base = list_dir(path);
    let mut combined = ImageList::default();

    let names = text.lines().map(str::trim).filter(|l| !l.is_empty());
    for (animation, name) in names.enumerate() {
        let list_path = base.join(name);
        let text = read_text(&list_path)?;
        let list = parse_image_list(&text, list_dir(&list_path), &list_path, Some(animation))?;
        combined.names.extend(list.names);
        combined.entries.extend(list.entries);
        combined.notes.extend(list.notes);
    }

    if combined.names.is_empty() {
        return Err(SprError::BadFormat {
            message: format!("Animation list {} names no image lists", path.display()),
            help: None,
        });
    }
    Ok(combined)
}
