//! Alpha-threshold transparency classification and edge scans.
//!
//! The same test drives both the dither engine (which pixels are skipped by
//! the run encoders) and the auto-crop scans that size animation frames.

use crate::error::Result;
use crate::types::{CropRect, EdgeMargins, FrameData, SourceImage};

/// Alpha values below this are transparent unless a threshold is configured.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 196;

/// Classify a single pixel.
///
/// Without an alpha channel nothing is transparent.
pub fn is_transparent(pixel: &[u8], alpha_present: bool, threshold: u8) -> bool {
    alpha_present && pixel[3] < threshold
}

/// Transparency test chosen once per image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyCheck {
    /// Compare the alpha byte against a threshold.
    AlphaAware { threshold: u8 },
    /// Source has no alpha channel; every pixel is opaque.
    OpaqueOnly,
}

impl TransparencyCheck {
    pub fn for_image(image: &SourceImage) -> Self {
        if image.format.has_alpha() {
            TransparencyCheck::AlphaAware {
                threshold: image.alpha_threshold,
            }
        } else {
            TransparencyCheck::OpaqueOnly
        }
    }

    pub fn is_transparent(self, pixel: &[u8]) -> bool {
        match self {
            TransparencyCheck::AlphaAware { threshold } => is_transparent(pixel, true, threshold),
            TransparencyCheck::OpaqueOnly => false,
        }
    }
}

fn row_is_clear(image: &SourceImage, check: TransparencyCheck, rect: CropRect, y: u32) -> bool {
    (rect.x..rect.x + rect.width).all(|x| check.is_transparent(image.pixel(x, y)))
}

fn column_is_clear(image: &SourceImage, check: TransparencyCheck, rect: CropRect, x: u32) -> bool {
    (rect.y..rect.y + rect.height).all(|y| check.is_transparent(image.pixel(x, y)))
}

/// Number of fully transparent rows at the top of the crop area.
///
/// A completely transparent area yields half its height.
pub fn unused_rows_top(image: &SourceImage) -> u32 {
    let check = TransparencyCheck::for_image(image);
    let rect = image.crop;
    (0..rect.height)
        .find(|&dy| !row_is_clear(image, check, rect, rect.y + dy))
        .unwrap_or(rect.height / 2)
}

/// Number of fully transparent rows at the bottom of the crop area.
///
/// A completely transparent area yields the other half of its height.
pub fn unused_rows_bottom(image: &SourceImage) -> u32 {
    let check = TransparencyCheck::for_image(image);
    let rect = image.crop;
    (0..rect.height)
        .find(|&dy| !row_is_clear(image, check, rect, rect.y + rect.height - 1 - dy))
        .unwrap_or(rect.height - rect.height / 2)
}

/// Number of fully transparent columns on the left of the crop area.
pub fn unused_columns_left(image: &SourceImage) -> u32 {
    let check = TransparencyCheck::for_image(image);
    let rect = image.crop;
    (0..rect.width)
        .find(|&dx| !column_is_clear(image, check, rect, rect.x + dx))
        .unwrap_or(rect.width / 2)
}

/// Number of fully transparent columns on the right of the crop area.
pub fn unused_columns_right(image: &SourceImage) -> u32 {
    let check = TransparencyCheck::for_image(image);
    let rect = image.crop;
    (0..rect.width)
        .find(|&dx| !column_is_clear(image, check, rect, rect.x + rect.width - 1 - dx))
        .unwrap_or(rect.width - rect.width / 2)
}

/// All four edge scans at once.
pub fn edge_margins(image: &SourceImage) -> EdgeMargins {
    EdgeMargins {
        top: unused_rows_top(image),
        bottom: unused_rows_bottom(image),
        left: unused_columns_left(image),
        right: unused_columns_right(image),
    }
}

/// Tight animation frame for the crop area, with the list-file fields
/// (`rotable`, `frames_count`, `unkn6`, `unkn8`) carried through.
pub fn auto_crop(image: &SourceImage, fields: [i32; 4]) -> Result<FrameData> {
    FrameData::from_margins(
        image.crop.width,
        image.crop.height,
        edge_margins(image),
        fields,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CropRequest, PixelFormat};

    /// Build an RGBA image where `opaque` cells get alpha 255 and the rest alpha 0.
    fn mask_image(width: u32, height: u32, opaque: &[(u32, u32)]) -> SourceImage {
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        for &(x, y) in opaque {
            let i = ((y * width + x) * 4) as usize;
            pixels[i..i + 4].copy_from_slice(&[10, 20, 30, 255]);
        }
        SourceImage::new(width, height, PixelFormat::Rgba, pixels).unwrap()
    }

    #[test]
    fn test_is_transparent_threshold() {
        assert!(is_transparent(&[0, 0, 0, 195], true, 196));
        assert!(!is_transparent(&[0, 0, 0, 196], true, 196));
        assert!(!is_transparent(&[0, 0, 0], false, 196));
    }

    #[test]
    fn test_check_selection() {
        let rgb = SourceImage::new(1, 1, PixelFormat::Rgb, vec![0, 0, 0]).unwrap();
        assert_eq!(TransparencyCheck::for_image(&rgb), TransparencyCheck::OpaqueOnly);

        let rgba = SourceImage::new(1, 1, PixelFormat::Rgba, vec![0, 0, 0, 0])
            .unwrap()
            .with_threshold(100);
        assert_eq!(
            TransparencyCheck::for_image(&rgba),
            TransparencyCheck::AlphaAware { threshold: 100 }
        );
        assert!(TransparencyCheck::for_image(&rgba).is_transparent(rgba.pixel(0, 0)));
    }

    #[test]
    fn test_edge_scans() {
        // 6x5 image with opaque pixels spanning x=2..=3, y=1..=2
        let img = mask_image(6, 5, &[(2, 1), (3, 2)]);
        assert_eq!(
            edge_margins(&img),
            EdgeMargins {
                top: 1,
                bottom: 2,
                left: 2,
                right: 2
            }
        );
    }

    #[test]
    fn test_fully_transparent_falls_back_to_half() {
        let img = mask_image(8, 6, &[]);
        assert_eq!(unused_rows_top(&img), 3);
        assert_eq!(unused_rows_bottom(&img), 3);
        assert_eq!(unused_columns_left(&img), 4);
        assert_eq!(unused_columns_right(&img), 4);

        let odd = mask_image(5, 3, &[]);
        assert_eq!(unused_rows_top(&odd) + unused_rows_bottom(&odd), 3);
        assert_eq!(unused_columns_left(&odd) + unused_columns_right(&odd), 5);
    }

    #[test]
    fn test_opaque_image_has_no_margins() {
        let img = SourceImage::new(3, 2, PixelFormat::Rgb, vec![0; 18]).unwrap();
        assert_eq!(edge_margins(&img), EdgeMargins::default());
    }

    #[test]
    fn test_scans_respect_crop() {
        let mut img = mask_image(8, 8, &[(5, 6)]);
        img.apply_crop(CropRequest { x: 4, y: 4, w: 3, h: 3 });
        assert_eq!(
            edge_margins(&img),
            EdgeMargins {
                top: 2,
                bottom: 0,
                left: 1,
                right: 1
            }
        );
    }

    #[test]
    fn test_auto_crop_frame() {
        let img = mask_image(6, 5, &[(2, 1), (3, 2)]);
        let frame = auto_crop(&img, [1, 4, -2, 7]).unwrap();
        assert_eq!((frame.s_width, frame.s_height), (2, 2));
        assert_eq!((frame.frame_width, frame.frame_height), (6, 5));
        assert_eq!((frame.frame_offs_w, frame.frame_offs_h), (2, 1));
        assert_eq!((frame.rotable, frame.frames_count), (1, 4));
        assert_eq!((frame.unkn6, frame.unkn8), (-2, 7));
    }
}
