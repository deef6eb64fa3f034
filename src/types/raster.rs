//! Source and indexed image types.
//!
//! A `SourceImage` holds decoded truecolor pixels plus the crop rectangle and
//! any per-frame metadata. Dithering turns it into an `IndexedImage`, which
//! owns the palette indices and the parallel transparency map for the cropped
//! area only.

use serde::Serialize;

use crate::error::{Result, SprError};

/// Pixel layout of a decoded source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        self == PixelFormat::Rgba
    }
}

/// Requested crop as read from a list file; negative values mean "not given".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRequest {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl CropRequest {
    /// No crop; the whole image is used.
    pub const FULL: Self = Self {
        x: -1,
        y: -1,
        w: -1,
        h: -1,
    };
}

impl Default for CropRequest {
    fn default() -> Self {
        Self::FULL
    }
}

/// Area of a source image that gets converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Resolve a request against the image size.
    ///
    /// An offset is kept only when it lies strictly inside the image, and an
    /// extent only when it is positive and ends before the image edge; anything
    /// else falls back to the rest of the image.
    pub fn clamped(request: CropRequest, width: u32, height: u32) -> Self {
        let x = axis_offset(request.x, width);
        let y = axis_offset(request.y, height);
        Self {
            x,
            y,
            width: axis_extent(request.w, x, width),
            height: axis_extent(request.h, y, height),
        }
    }
}

fn axis_offset(requested: i32, extent: u32) -> u32 {
    if requested > 0 && (requested as u32) < extent {
        requested as u32
    } else {
        0
    }
}

fn axis_extent(requested: i32, offset: u32, extent: u32) -> u32 {
    if requested > 0 && offset as u64 + (requested as u64) < extent as u64 {
        requested as u32
    } else {
        extent - offset
    }
}

/// Animation frame geometry carried by Jonty sprite table entries.
///
/// `unkn6` and `unkn8` are opaque values taken from the list file and written
/// back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameData {
    pub s_width: u32,
    pub s_height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_offs_w: u32,
    pub frame_offs_h: u32,
    pub rotable: u8,
    pub frames_count: u8,
    pub unkn6: i16,
    pub unkn8: i16,
}

/// Count of fully transparent rows/columns along each edge of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeMargins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl FrameData {
    /// Build frame data for a `width` x `height` frame with the given transparent
    /// margins and list-file fields (`rotable`, `frames_count`, `unkn6`, `unkn8`).
    pub fn from_margins(
        width: u32,
        height: u32,
        margins: EdgeMargins,
        fields: [i32; 4],
    ) -> Result<Self> {
        Ok(Self {
            s_width: width.saturating_sub(margins.left + margins.right),
            s_height: height.saturating_sub(margins.top + margins.bottom),
            frame_width: width,
            frame_height: height,
            frame_offs_w: margins.left,
            frame_offs_h: margins.top,
            rotable: narrow(fields[0], "rotable")?,
            frames_count: narrow(fields[1], "frames_count")?,
            unkn6: narrow(fields[2], "unkn6")?,
            unkn8: narrow(fields[3], "unkn8")?,
        })
    }
}

fn narrow<T: TryFrom<i32>>(value: i32, name: &str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| SprError::limit(format!("Frame field {} = {} is out of range", name, value)))
}

/// A decoded truecolor image awaiting conversion.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Row-major pixel bytes, `bytes_per_pixel` per pixel.
    pub pixels: Vec<u8>,
    pub crop: CropRect,
    /// Alpha below this value counts as transparent.
    pub alpha_threshold: u8,
    /// Frame metadata, present only for animation-frame formats.
    pub frame: Option<FrameData>,
}

impl SourceImage {
    /// Wrap raw pixel bytes; the crop defaults to the whole image.
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(SprError::bad_format(format!(
                "Pixel buffer holds {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
            crop: CropRect::full(width, height),
            alpha_threshold: crate::transparency::DEFAULT_ALPHA_THRESHOLD,
            frame: None,
        })
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    /// Apply a crop request, clamped to the image bounds.
    pub fn apply_crop(&mut self, request: CropRequest) {
        self.crop = CropRect::clamped(request, self.width, self.height);
    }

    /// Bytes of the pixel at absolute coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let bpp = self.format.bytes_per_pixel();
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        &self.pixels[start..start + bpp]
    }
}

/// Palette indices plus transparency map for a converted image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    indices: Vec<u8>,
    transparent: Vec<bool>,
    pub frame: Option<FrameData>,
}

impl IndexedImage {
    /// Build an indexed image; both grids must hold `width * height` cells.
    pub fn new(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        transparent: Vec<bool>,
    ) -> Result<Self> {
        let cells = width as usize * height as usize;
        if indices.len() != cells || transparent.len() != cells {
            return Err(SprError::bad_format(format!(
                "Indexed grid sizes {} / {} do not match {}x{}",
                indices.len(),
                transparent.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            indices,
            transparent,
            frame: None,
        })
    }

    /// Palette indices of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let w = self.width as usize;
        &self.indices[y as usize * w..(y as usize + 1) * w]
    }

    /// Transparency flags of row `y`.
    pub fn transparent_row(&self, y: u32) -> &[bool] {
        let w = self.width as usize;
        &self.transparent[y as usize * w..(y as usize + 1) * w]
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn transparency(&self) -> &[bool] {
        &self.transparent
    }
}
