//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::load_from_memory_with_format` |
//! | Crop | `image::DynamicImage::crop_imm` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality × 100) |
//! | Encode → WebP | `webp::Encoder` (lossy, quality × 100) |

use super::backend::{BackendError, ImageBackend, ImageSource, Surface};
use super::calculations::CropRegion;
use super::params::{MimeType, Quality};
use crate::types::InputFile;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use std::sync::LazyLock;

/// Formats accepted on input, by extension.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Sniff the format from the leading bytes and reject anything outside
/// PNG/JPEG/WebP.
fn detect_format(file: &InputFile) -> Result<ImageFormat, BackendError> {
    let format = image::guess_format(&file.bytes).map_err(|e| {
        BackendError::Decode(format!("Unrecognized image data in {}: {}", file.name, e))
    })?;
    if PHOTO_CANDIDATES.iter().any(|(_, f)| *f == format) {
        Ok(format)
    } else {
        Err(BackendError::Decode(format!(
            "Unsupported input format {:?} in {}",
            format, file.name
        )))
    }
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let rgba = img.to_rgba8();
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| BackendError::Encode(format!("PNG encode failed: {}", e)))?;
    Ok(buf)
}

/// JPEG has no alpha channel, so pixels are flattened to RGB first.
fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.percent())
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))?;
    Ok(buf)
}

/// Lossy WebP through libwebp; the `image` crate can only write lossless.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgba = img.to_rgba8();
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, quality.value() * 100.0)
        .map_err(|e| BackendError::Encode(format!("WebP encode failed: {:?}", e)))?;
    Ok(encoded.to_vec())
}

impl ImageBackend for RustBackend {
    fn decode(&self, file: &InputFile) -> Result<ImageSource, BackendError> {
        let format = detect_format(file)?;
        image::load_from_memory_with_format(&file.bytes, format)
            .map(ImageSource::new)
            .map_err(|e| BackendError::Decode(format!("Failed to decode {}: {}", file.name, e)))
    }

    fn crop(&self, source: &ImageSource, region: CropRegion) -> Result<ImageSource, BackendError> {
        let natural = source.natural();
        let fits = region.x.checked_add(region.width).is_some_and(|r| r <= natural.width)
            && region.y.checked_add(region.height).is_some_and(|b| b <= natural.height);
        if !fits || region.width == 0 || region.height == 0 {
            return Err(BackendError::Decode(format!(
                "Crop {}x{}+{}+{} outside {}x{} source",
                region.width, region.height, region.x, region.y, natural.width, natural.height
            )));
        }
        let cropped = source
            .image()
            .crop_imm(region.x, region.y, region.width, region.height);
        Ok(ImageSource::new(cropped))
    }

    fn resize(&self, source: &ImageSource, destination: Surface) -> Result<Surface, BackendError> {
        let target = destination.dimensions();
        let resized = source
            .image()
            .resize_exact(target.width, target.height, FilterType::Lanczos3);
        destination.write(resized)
    }

    fn encode(
        &self,
        surface: &Surface,
        mime_type: &MimeType,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let img = surface
            .pixels()
            .ok_or_else(|| BackendError::Encode("Surface has not been written".into()))?;

        match mime_type.mime_type.as_str() {
            "image/png" => encode_png(img),
            "image/jpeg" => encode_jpeg(img, quality),
            "image/webp" => encode_webp(img, quality),
            other => Err(BackendError::Encode(format!(
                "Unsupported output format: {}",
                other
            ))),
        }
    }
}
