//! # Simple Resize
//!
//! Batch image resizing: decode, plan the target size, optionally center-crop,
//! resample, encode, and hand the result back as a named file, a base64 data
//! URI, or raw bytes.
//!
//! # Architecture: Load, then Pipeline
//!
//! Every image goes through two phases:
//!
//! ```text
//! 1. Load      bytes        →  LoadedImage     (decode, plan, cover crop)
//! 2. Pipeline  LoadedImage  →  Output          (resize, encode, materialize)
//! ```
//!
//! The phases fail differently. A load failure means the input itself is
//! unusable and is returned as an error; in a batch it fails the whole call.
//! A pipeline failure is returned as a value in that image's slot, so one bad
//! encode never hides the other results.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension planning, the [`ImageBackend`](imaging::ImageBackend) trait, the pure Rust backend, materialization |
//! | [`process`] | `resize_image` / `resize_images`, parallel batching, progress events, writing results |
//! | [`naming`] | Generated output names: `image-<millis>-<random>.<ext>` |
//! | [`config`] | `config.toml` loading, validation, and layering under CLI flags |
//! | [`types`] | Input files and the per-image run report |
//! | [`output`] | CLI output formatting for progress and the end-of-run summary |
//!
//! # Design Decisions
//!
//! ## Aspect Ratio Follows the Source
//!
//! Give one dimension and the other follows the source aspect ratio, rounded
//! to the nearest pixel. Give both and the canvas is exact: the source is
//! stretched to fit, or with `cover` center-cropped to the target aspect ratio
//! first. Give neither and images are scaled to a height of 100px.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decoding, Lanczos3
//! resampling, and encoding. No system libraries are needed, so the binary is
//! self-contained.
//!
//! ## Swappable Clock and Randomness
//!
//! Output names depend on the wall clock and a random suffix. Both come from a
//! [`NameSource`](naming::NameSource) passed into the pipeline, so tests can pin
//! names exactly.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod types;

pub use process::{resize_image, resize_image_default, resize_images, resize_images_default};

#[cfg(test)]
pub(crate) mod test_helpers;
