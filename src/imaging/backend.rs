//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four capabilities the pipeline calls
//! out to: decode, crop, resize, and encode. Everything that decides *what*
//! to do (dimension planning, output dispatch) lives outside the backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust on top of
//! the `image` crate.

use super::calculations::{CropRegion, Dimensions};
use super::params::{MimeType, Quality};
use crate::types::InputFile;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Resize failed: {0}")]
    Resize(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Decoded pixels with their natural size.
#[derive(Debug, Clone)]
pub struct ImageSource {
    image: DynamicImage,
}

impl ImageSource {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn natural(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// A resize target: declared dimensions, pixels written exactly once.
#[derive(Debug, Clone)]
pub struct Surface {
    dimensions: Dimensions,
    pixels: Option<DynamicImage>,
}

impl Surface {
    /// Allocate an empty surface of the given size.
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            pixels: None,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn pixels(&self) -> Option<&DynamicImage> {
        self.pixels.as_ref()
    }

    /// Fill the surface. Fails if it was already written or if `pixels`
    /// doesn't match the declared size.
    pub fn write(self, pixels: DynamicImage) -> Result<Self, BackendError> {
        if self.pixels.is_some() {
            return Err(BackendError::Resize("surface already written".into()));
        }
        let got = Dimensions::new(pixels.width(), pixels.height());
        if got != self.dimensions {
            return Err(BackendError::Resize(format!(
                "surface is {}x{}, pixels are {}x{}",
                self.dimensions.width, self.dimensions.height, got.width, got.height
            )));
        }
        Ok(Self {
            dimensions: self.dimensions,
            pixels: Some(pixels),
        })
    }
}

/// Trait for image processing backends.
///
/// Implementations must be `Sync`: batch operations call into one backend
/// from several rayon workers at once.
pub trait ImageBackend: Sync {
    /// Decode an input file into pixels.
    fn decode(&self, file: &InputFile) -> Result<ImageSource, BackendError>;

    /// Extract `region` of `source` as a new, independent source.
    fn crop(&self, source: &ImageSource, region: CropRegion) -> Result<ImageSource, BackendError>;

    /// Resample `source` into `destination`, returning the written surface.
    fn resize(&self, source: &ImageSource, destination: Surface) -> Result<Surface, BackendError>;

    /// Encode a written surface as `mime_type`.
    fn encode(
        &self,
        surface: &Surface,
        mime_type: &MimeType,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
