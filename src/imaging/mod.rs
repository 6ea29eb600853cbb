//! Image processing — pure Rust, no system libraries.
//!
//! | Step | Module |
//! |---|---|
//! | **Plan** canvas size and cover crop | [`calculations`] |
//! | **Load**: decode, plan, crop | [`loader`] |
//! | **Resize → encode** | [`operations`] via the [`ImageBackend`] |
//! | **Materialize** as file / base64 / blob | [`materialize`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing the requested output
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Loader / Operations**: Per-image steps combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod loader;
pub mod materialize;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, ImageSource, Surface};
pub use calculations::{
    Constraint, CropRegion, Dimensions, InvalidDimension, Plan, ResizeConstraints,
    calculate_cover_crop, plan_dimensions,
};
pub use loader::{LoadError, LoadedImage, load};
pub use materialize::{NamedFile, Output};
pub use operations::{PipelineError, PipelineResult, resize};
pub use params::{MimeType, OutputKind, OutputSpec, Quality, ResizeOptions};
pub use rust_backend::{RustBackend, supported_input_extensions};
