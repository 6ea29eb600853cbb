//! Shared test utilities: synthetic images and their encoded bytes.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let file = InputFile::new("a.png", png_bytes(&gradient_image(800, 400)));
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_png(tmp.path(), "wide.png", 800, 400);
//! ```

use crate::types::InputFile;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

// =========================================================================
// Pixel buffers
// =========================================================================

/// Smooth gradient; compresses well and makes pixel positions recognizable.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Seeded noise; compresses badly, so encoder quality shows up in the size.
pub fn noise_image(width: u32, height: u32) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    RgbImage::from_fn(width, height, |_, _| Rgb([rng.r#gen(), rng.r#gen(), rng.r#gen()]))
}

// =========================================================================
// Encoded bytes
// =========================================================================

pub fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

pub fn jpeg_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// An in-memory PNG input of the given size.
pub fn png_file(name: &str, width: u32, height: u32) -> InputFile {
    InputFile::new(name, png_bytes(&gradient_image(width, height)))
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Write a PNG of the given size into `dir`.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    std::fs::write(dir.join(name), png_bytes(&gradient_image(width, height))).unwrap();
}
