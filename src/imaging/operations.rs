//! The resize pipeline.
//!
//! Takes a [`LoadedImage`], calls the backend to resize and encode it, and
//! materializes the encoded bytes as the requested [`Output`].
//!
//! Resize and encode failures do not abort the caller: they come back as the
//! `Err` arm of a [`PipelineResult`], which the public operations hand back
//! as a *value*. Only load failures (decode, bad dimensions) propagate as
//! errors. A batch therefore keeps every image that did resize, and callers
//! check each slot.

use super::backend::{BackendError, ImageBackend};
use super::loader::LoadedImage;
use super::materialize::{Output, materialize};
use super::params::OutputSpec;
use crate::naming::NameSource;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{name}: {source}")]
    Resize {
        name: String,
        #[source]
        source: BackendError,
    },
    #[error("{name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: BackendError,
    },
}

/// Outcome of resizing one loaded image.
pub type PipelineResult = Result<Output, PipelineError>;

/// Resize, encode, and materialize one image.
///
/// Consumes `loaded`: the decoded pixels are dropped as soon as the resize
/// is done, the surface once it has been encoded.
pub fn resize(
    backend: &impl ImageBackend,
    loaded: LoadedImage,
    spec: &OutputSpec,
    names: &impl NameSource,
) -> PipelineResult {
    let LoadedImage {
        name,
        source: pixels,
        destination,
        ..
    } = loaded;

    let resized = backend.resize(&pixels, destination);
    drop(pixels);
    let surface = resized.map_err(|source| PipelineError::Resize {
        name: name.clone(),
        source,
    })?;

    let bytes = backend
        .encode(&surface, &spec.mime_type, spec.quality)
        .map_err(|source| PipelineError::Encode {
            name: name.clone(),
            source,
        })?;
    drop(surface);

    log::debug!(
        "{}: encoded {} bytes as {}",
        name,
        bytes.len(),
        spec.mime_type.mime_type
    );

    Ok(materialize(bytes, &spec.mime_type, spec.kind, names))
}
