//! Source image loading.
//!
//! Any raster the `image` crate can read is accepted. Images with an alpha
//! channel are kept as RGBA, everything else is flattened to RGB.

use std::path::Path;

use image::{DynamicImage, ImageError};

use crate::error::{Result, SprError};
use crate::types::{PixelFormat, SourceImage};

/// Load the image at `path` with the given alpha threshold.
pub fn load_source_image(path: &Path, threshold: u8) -> Result<SourceImage> {
    let decoded = image::open(path).map_err(|e| match e {
        ImageError::IoError(io) => SprError::CannotOpen {
            path: path.to_path_buf(),
            message: io.to_string(),
        },
        other => SprError::BadFormat {
            message: format!("Cannot decode {}: {}", path.display(), other),
            help: None,
        },
    })?;
    Ok(from_dynamic(decoded)?.with_threshold(threshold))
}

/// Wrap an already decoded image.
pub fn from_dynamic(decoded: DynamicImage) -> Result<SourceImage> {
    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(SprError::bad_format(format!(
            "Image has no pixels ({}x{})",
            width, height
        )));
    }

    if decoded.color().has_alpha() {
        SourceImage::new(width, height, PixelFormat::Rgba, decoded.to_rgba8().into_raw())
    } else {
        SourceImage::new(width, height, PixelFormat::Rgb, decoded.to_rgb8().into_raw())
    }
}
