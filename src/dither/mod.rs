//! Error-diffusion conversion of truecolor pixels to palette indices.
//!
//! Pixels of the crop area are visited in raster order. Each one gets the
//! accumulated error of its neighbours added, is matched against the palette,
//! and (when opaque) spreads its own quantization error through the selected
//! kernel after scaling by the level curve.

mod kernel;
mod level;

pub use kernel::{DiffusionKernel, KernelWeights, MARGIN};
pub use level::LevelCurve;

use crate::error::{alloc_zeroed, Result};
use crate::transparency::TransparencyCheck;
use crate::types::{Colour, IndexedImage, Palette, SourceImage};

/// Pixels with alpha at or below this never propagate error.
pub const PROPAGATION_ALPHA: u8 = 192;

/// Level used when none is configured: the full error is diffused.
pub const DEFAULT_LEVEL: i32 = 100;

/// Per-channel error accumulators for one image, padded by `MARGIN` on every side.
struct ErrorPlanes {
    stride: usize,
    channels: [Vec<f32>; 3],
}

impl ErrorPlanes {
    fn new(width: usize, height: usize) -> Result<Self> {
        let stride = width + 2 * MARGIN;
        let len = stride * (height + 2 * MARGIN);
        Ok(Self {
            stride,
            channels: [
                alloc_zeroed(len, "red error buffer")?,
                alloc_zeroed(len, "green error buffer")?,
                alloc_zeroed(len, "blue error buffer")?,
            ],
        })
    }

    fn offset(&self, x: usize, y: usize, dx: i32, dy: i32) -> usize {
        let col = (x + MARGIN) as i32 + dx;
        let row = (y + MARGIN) as i32 + dy;
        row as usize * self.stride + col as usize
    }

    /// Source colour plus rounded accumulated error, clamped per channel.
    fn adjust(&self, x: usize, y: usize, colour: Colour) -> Colour {
        let at = self.offset(x, y, 0, 0);
        let clamp = |value: u8, plane: &[f32]| -> u8 {
            let sum = (value as f32 + (plane[at] + 0.5)) as i32;
            sum.clamp(0, 255) as u8
        };
        Colour::rgb(
            clamp(colour.r, &self.channels[0]),
            clamp(colour.g, &self.channels[1]),
            clamp(colour.b, &self.channels[2]),
        )
    }

    fn diffuse(&mut self, weights: KernelWeights, x: usize, y: usize, error: [f32; 3]) {
        let divisor = weights.divisor as f32;
        for &(dx, dy, weight) in weights.entries {
            let at = self.offset(x, y, dx, dy);
            let share = weight as f32 / divisor;
            for (plane, err) in self.channels.iter_mut().zip(error) {
                plane[at] += err * share;
            }
        }
    }
}

/// Converts source images to palette indices with a fixed kernel and level.
pub struct DitherEngine<'a> {
    palette: &'a Palette,
    kernel: DiffusionKernel,
    curve: LevelCurve,
}

impl<'a> DitherEngine<'a> {
    pub fn new(palette: &'a Palette, kernel: DiffusionKernel, level: i32) -> Self {
        Self {
            palette,
            kernel,
            curve: LevelCurve::new(level),
        }
    }

    pub fn kernel(&self) -> DiffusionKernel {
        self.kernel
    }

    pub fn level(&self) -> i32 {
        self.curve.level()
    }

    /// Convert the crop area of `image` into an indexed image of the same size.
    ///
    /// The result has no crop offset; its origin is the crop's top-left corner.
    /// Error buffers are allocated per call and never shared between images.
    pub fn convert(&self, image: &SourceImage) -> Result<IndexedImage> {
        let rect = image.crop;
        let width = rect.width as usize;
        let height = rect.height as usize;
        let check = TransparencyCheck::for_image(image);
        let has_alpha = image.format.has_alpha();
        let weights = self.kernel.weights();

        let mut errors = ErrorPlanes::new(width, height)?;
        let mut indices: Vec<u8> = alloc_zeroed(width * height, "index grid")?;
        let mut transparent: Vec<bool> = alloc_zeroed(width * height, "transparency map")?;

        for y in 0..height {
            for x in 0..width {
                let pixel = image.pixel(rect.x + x as u32, rect.y + y as u32);
                let cell = y * width + x;
                let source = Colour::from_pixel(pixel);

                if check.is_transparent(pixel) {
                    transparent[cell] = true;
                    indices[cell] = self.palette.nearest(source);
                    continue;
                }

                let adjusted = errors.adjust(x, y, source);
                let index = self.palette.nearest(adjusted);
                indices[cell] = index;

                let alpha = if has_alpha { pixel[3] } else { u8::MAX };
                if alpha > PROPAGATION_ALPHA {
                    let matched = self.palette.colours()[index as usize];
                    let error = [
                        self.curve.apply(adjusted.r as i32 - matched.r as i32),
                        self.curve.apply(adjusted.g as i32 - matched.g as i32),
                        self.curve.apply(adjusted.b as i32 - matched.b as i32),
                    ];
                    errors.diffuse(weights, x, y, error);
                }
            }
        }

        let mut indexed = IndexedImage::new(rect.width, rect.height, indices, transparent)?;
        indexed.frame = image.frame;
        Ok(indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CropRequest, PixelFormat};

    fn grey_palette() -> Palette {
        Palette::new(vec![Colour::BLACK, Colour::WHITE]).unwrap()
    }

    fn gradient(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 255) / width.max(1)) as u8;
                pixels.extend_from_slice(&[v, v.wrapping_add(y as u8), 255 - v, 255]);
            }
        }
        SourceImage::new(width, height, PixelFormat::Rgba, pixels).unwrap()
    }

    #[test]
    fn test_exact_colours_map_directly() {
        let palette = Palette::new(vec![
            Colour::BLACK,
            Colour::WHITE,
            Colour::rgb(255, 0, 0),
            Colour::rgb(0, 255, 0),
        ])
        .unwrap();
        let pixels = [[0, 0, 0], [255, 255, 255], [255, 0, 0], [0, 255, 0]].concat();
        let img = SourceImage::new(4, 1, PixelFormat::Rgb, pixels).unwrap();

        let out = DitherEngine::new(&palette, DiffusionKernel::FloydSteinberg, 100)
            .convert(&img)
            .unwrap();
        assert_eq!(out.indices(), &[0, 1, 2, 3]);
        assert!(out.transparency().iter().all(|&t| !t));
    }

    #[test]
    fn test_mid_grey_alternates_with_full_diffusion() {
        // 128 grey between black and white: error diffusion must produce a mix
        let img = SourceImage::new(8, 1, PixelFormat::Rgb, vec![128; 24]).unwrap();
        let palette = grey_palette();

        let diffused = DitherEngine::new(&palette, DiffusionKernel::FloydSteinberg, 100)
            .convert(&img)
            .unwrap();
        let whites = diffused.indices().iter().filter(|&&i| i == 1).count();
        assert!(whites > 0 && whites < 8);

        // Without propagation every pixel maps to the same nearest colour
        let flat = DitherEngine::new(&palette, DiffusionKernel::FloydSteinberg, 0)
            .convert(&img)
            .unwrap();
        assert!(flat.indices().iter().all(|&i| i == 1));
    }

    #[test]
    fn test_deterministic() {
        let img = gradient(13, 7);
        let palette = Palette::new(vec![
            Colour::BLACK,
            Colour::WHITE,
            Colour::rgb(255, 0, 0),
            Colour::rgb(0, 0, 255),
            Colour::rgb(0, 128, 0),
        ])
        .unwrap();

        for kernel in DiffusionKernel::ALL {
            let engine = DitherEngine::new(&palette, kernel, 80);
            let first = engine.convert(&img).unwrap();
            let second = engine.convert(&img).unwrap();
            assert_eq!(first, second, "{}", kernel);
        }
    }

    #[test]
    fn test_opaque_source_has_no_transparency() {
        let img = SourceImage::new(5, 3, PixelFormat::Rgb, vec![0; 45]).unwrap();
        let out = DitherEngine::new(&grey_palette(), DiffusionKernel::Stucki, 100)
            .convert(&img)
            .unwrap();
        assert!(out.transparency().iter().all(|&t| !t));
    }

    #[test]
    fn test_transparent_pixels_do_not_receive_error() {
        // Opaque grey followed by a transparent grey pixel: the transparent one is
        // matched on its raw colour even though error was pushed towards it.
        let pixels = [[100, 100, 100, 255], [100, 100, 100, 0]].concat();
        let img = SourceImage::new(2, 1, PixelFormat::Rgba, pixels).unwrap();
        let out = DitherEngine::new(&grey_palette(), DiffusionKernel::FloydSteinberg, 100)
            .convert(&img)
            .unwrap();
        assert_eq!(out.transparency(), &[false, true]);
        assert_eq!(out.indices(), &[0, 0]);
    }

    #[test]
    fn test_semi_transparent_pixels_do_not_propagate() {
        // Alpha 150 is opaque under threshold 100 but below the propagation limit,
        // so the second pixel sees no error and stays black.
        let pixels = [[100, 100, 100, 150], [100, 100, 100, 255]].concat();
        let img = SourceImage::new(2, 1, PixelFormat::Rgba, pixels)
            .unwrap()
            .with_threshold(100);
        let out = DitherEngine::new(&grey_palette(), DiffusionKernel::FloydSteinberg, 100)
            .convert(&img)
            .unwrap();
        assert_eq!(out.transparency(), &[false, false]);
        assert_eq!(out.indices(), &[0, 0]);
    }

    #[test]
    fn test_output_matches_crop() {
        let mut img = gradient(10, 6);
        img.apply_crop(CropRequest { x: 2, y: 1, w: 5, h: 3 });
        let out = DitherEngine::new(&grey_palette(), DiffusionKernel::Atkinson, 100)
            .convert(&img)
            .unwrap();
        assert_eq!((out.width, out.height), (5, 3));
        assert_eq!(out.indices().len(), 15);
        assert_eq!(out.transparency().len(), 15);
    }

    #[test]
    fn test_error_does_not_wrap_across_rows() {
        // A single-column image: error pushed to the right lands in the margin,
        // never in the next row's first pixel.
        let img = SourceImage::new(1, 4, PixelFormat::Rgb, vec![100; 12]).unwrap();
        let out = DitherEngine::new(&grey_palette(), DiffusionKernel::ShiauFan5, 100)
            .convert(&img)
            .unwrap();
        assert_eq!(out.indices().len(), 4);
    }
}
