//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how* to produce it. They are
//! the interface between the public operations (which decide what to build for
//! each input) and the [`backend`](super::backend) (which does the pixel
//! work). This separation allows swapping backends (e.g. for testing with a
//! mock) without changing pipeline logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality in `(0, 1]`, default `1.0`.
//! - [`MimeType`] — Content-type / file-extension pairing used for encoding and naming.
//! - [`OutputKind`] — Which representation the pipeline hands back.
//! - [`OutputSpec`] — Everything the pipeline needs after the resize: format, quality, kind.
//! - [`ResizeOptions`] — The full caller-facing option set for one resize.

use super::calculations::ResizeConstraints;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding, in `(0, 1]`.
///
/// Out-of-range values never reach an encoder: anything above 1 is clamped
/// down, and zero, negative, or non-finite values fall back to the default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value.min(1.0))
        } else {
            Self::default()
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale used by the JPEG encoder.
    /// WebP takes the unrounded `value() * 100`.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Content-type and file-extension pairing for an output format.
///
/// The pairing is trusted as given: nothing checks that `extension` matches
/// `mime_type`. Use [`MimeType::png`], [`MimeType::jpeg`] or
/// [`MimeType::webp`] for the known-good pairings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeType {
    pub mime_type: String,
    pub extension: String,
}

impl MimeType {
    pub fn new(mime_type: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            extension: extension.into(),
        }
    }

    pub fn png() -> Self {
        Self::new("image/png", "png")
    }

    pub fn jpeg() -> Self {
        Self::new("image/jpeg", "jpeg")
    }

    pub fn webp() -> Self {
        Self::new("image/webp", "webp")
    }

    /// Look up a known pairing by short name (`png`, `jpeg`/`jpg`, `webp`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(Self::png()),
            "jpeg" | "jpg" => Some(Self::jpeg()),
            "webp" => Some(Self::webp()),
            _ => None,
        }
    }
}

impl Default for MimeType {
    fn default() -> Self {
        Self::webp()
    }
}

/// Representation handed back by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// A named file object (`image-<millis>-<suffix>.<ext>`).
    #[default]
    File,
    /// A `data:<mime>;base64,...` URI.
    Base64,
    /// The encoded bytes, untouched.
    Blob,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputKind::File => "file",
            OutputKind::Base64 => "base64",
            OutputKind::Blob => "blob",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(OutputKind::File),
            "base64" => Ok(OutputKind::Base64),
            "blob" => Ok(OutputKind::Blob),
            other => Err(format!("unknown output kind: {other}")),
        }
    }
}

/// What to do with a resized surface: encode as `mime_type` at `quality`,
/// then materialize as `kind`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputSpec {
    pub mime_type: MimeType,
    pub quality: Quality,
    pub kind: OutputKind,
}

/// Caller-facing options for a resize.
///
/// `ResizeOptions::default()` is the "no options" case: natural aspect scaled
/// to a height of 100, encoded as WEBP at full quality, returned as a file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResizeOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub cover: bool,
    pub mime_type: MimeType,
    pub quality: Quality,
    pub output: OutputKind,
}

impl ResizeOptions {
    pub fn constraints(&self) -> ResizeConstraints {
        ResizeConstraints {
            width: self.width,
            height: self.height,
            cover: self.cover,
        }
    }

    pub fn output_spec(&self) -> OutputSpec {
        OutputSpec {
            mime_type: self.mime_type.clone(),
            quality: self.quality,
            kind: self.output,
        }
    }
}
