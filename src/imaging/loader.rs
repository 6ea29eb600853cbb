//! Loading an input file into pixels ready for resize.
//!
//! Decode → plan → (cover only) crop. The result owns its decoded pixels and
//! an empty destination [`Surface`] sized by the plan; the pipeline consumes
//! it, so everything is released once the image has been encoded.

use super::backend::{BackendError, ImageBackend, ImageSource, Surface};
use super::calculations::{Constraint, InvalidDimension, Plan, ResizeConstraints, plan_dimensions};
use crate::types::InputFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: BackendError,
    },
    #[error("{name}: {source}")]
    InvalidDimension {
        name: String,
        #[source]
        source: InvalidDimension,
    },
}

impl LoadError {
    pub fn name(&self) -> &str {
        match self {
            LoadError::Decode { name, .. } | LoadError::InvalidDimension { name, .. } => name,
        }
    }
}

/// A decoded image and the surface it will be resized into.
#[derive(Debug)]
pub struct LoadedImage {
    pub name: String,
    /// Decoded pixels, already cropped in cover mode.
    pub source: ImageSource,
    pub destination: Surface,
    pub plan: Plan,
}

/// Decode `file` and prepare it for resizing under `constraints`.
pub fn load(
    backend: &impl ImageBackend,
    file: &InputFile,
    constraints: ResizeConstraints,
) -> Result<LoadedImage, LoadError> {
    let invalid = |source| LoadError::InvalidDimension {
        name: file.name.clone(),
        source,
    };
    let decode_failed = |source| LoadError::Decode {
        name: file.name.clone(),
        source,
    };

    let constraint = Constraint::resolve(constraints).map_err(invalid)?;
    let source = backend.decode(file).map_err(decode_failed)?;
    let plan = plan_dimensions(source.natural(), constraint).map_err(invalid)?;

    log::debug!(
        "{}: {}x{} -> {}x{}{}",
        file.name,
        plan.natural.width,
        plan.natural.height,
        plan.target.width,
        plan.target.height,
        plan.crop
            .map(|c| format!(" (crop {}x{}+{}+{})", c.width, c.height, c.x, c.y))
            .unwrap_or_default()
    );

    let source = match plan.crop {
        Some(region) => backend.crop(&source, region).map_err(decode_failed)?,
        None => source,
    };

    Ok(LoadedImage {
        name: file.name.clone(),
        source,
        destination: Surface::new(plan.target),
        plan,
    })
}
