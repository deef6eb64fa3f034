//! Benchmarks for the palspr pipeline.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use palspr::encode::{encode_huge, encode_small, SpriteWriter};
use palspr::{Colour, DiffusionKernel, DitherEngine, IndexedImage, Palette, PixelFormat, SourceImage};

/// 6x6x6 colour cube plus a grey ramp, 256 entries.
fn cube_palette() -> Palette {
    let mut colours = Vec::with_capacity(256);
    for r in 0..6u8 {
        for g in 0..6u8 {
            for b in 0..6u8 {
                colours.push(Colour::rgb(r * 51, g * 51, b * 51));
            }
        }
    }
    while colours.len() < 256 {
        let v = ((colours.len() - 216) * 6) as u8;
        colours.push(Colour::rgb(v, v, v));
    }
    Palette::new(colours).unwrap()
}

/// Gradient sprite with a transparent border ring.
fn sprite(size: u32) -> SourceImage {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let edge = x < 4 || y < 4 || x >= size - 4 || y >= size - 4;
            pixels.extend_from_slice(&[
                ((x * 2) % 256) as u8,
                ((y * 2) % 256) as u8,
                (((x + y) * 3) % 256) as u8,
                if edge { 0 } else { 255 },
            ]);
        }
    }
    SourceImage::new(size, size, PixelFormat::Rgba, pixels).unwrap()
}

// -- Dithering benchmarks --

fn bench_dithering(c: &mut Criterion) {
    let mut group = c.benchmark_group("dithering");

    let palette = cube_palette();
    let image = sprite(128);

    group.bench_function("nearest_only", |b| {
        let engine = DitherEngine::new(&palette, DiffusionKernel::FloydSteinberg, 0);
        b.iter(|| engine.convert(black_box(&image)).unwrap())
    });

    group.bench_function("floyd_steinberg", |b| {
        let engine = DitherEngine::new(&palette, DiffusionKernel::FloydSteinberg, 100);
        b.iter(|| engine.convert(black_box(&image)).unwrap())
    });

    group.bench_function("jarvis_judice_ninke", |b| {
        let engine = DitherEngine::new(&palette, DiffusionKernel::JarvisJudiceNinke, 100);
        b.iter(|| engine.convert(black_box(&image)).unwrap())
    });

    group.finish();
}

// -- Encoding benchmarks --

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");

    let palette = cube_palette();
    let engine = DitherEngine::new(&palette, DiffusionKernel::FloydSteinberg, 100);
    let images: Vec<IndexedImage> = (0..12)
        .map(|_| engine.convert(&sprite(64)).unwrap())
        .collect();

    group.bench_function("small_sprite_batch", |b| {
        b.iter(|| {
            let mut out = SpriteWriter::new(Cursor::new(Vec::new()), "bench");
            encode_small(&mut out, black_box(&images)).unwrap()
        })
    });

    group.bench_function("huge_sprite", |b| {
        b.iter(|| {
            let mut out = SpriteWriter::new(Cursor::new(Vec::new()), "bench");
            encode_huge(&mut out, black_box(&images[0])).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_dithering, bench_encoding);
criterion_main!(benches);
