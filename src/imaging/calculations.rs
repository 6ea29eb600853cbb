//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! The caller's `{width?, height?, cover?}` constraints are resolved once into
//! a [`Constraint`] variant, then [`plan_dimensions`] turns the variant plus the
//! image's natural size into a [`Plan`]: the canvas to allocate and, for cover
//! mode, the source region to sample.

use serde::Serialize;
use thiserror::Error;

/// Canvas height used when no width or height is requested.
pub const NATURAL_TARGET_HEIGHT: u32 = 100;

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A width or height that cannot produce a positive canvas.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid {axis}: {value}")]
pub struct InvalidDimension {
    pub axis: &'static str,
    pub value: f64,
}

impl InvalidDimension {
    fn new(axis: &'static str, value: impl Into<f64>) -> Self {
        Self {
            axis,
            value: value.into(),
        }
    }
}

/// Raw constraints as the caller supplies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeConstraints {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Only meaningful when both `width` and `height` are set.
    pub cover: bool,
}

/// The four meaningful shapes of [`ResizeConstraints`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Nothing requested: scale to a height of [`NATURAL_TARGET_HEIGHT`].
    Natural,
    WidthOnly(u32),
    HeightOnly(u32),
    /// Exact canvas. With `cover`, the source is center-cropped to the
    /// target aspect first; without it, the source is stretched.
    Both { width: u32, height: u32, cover: bool },
}

impl Constraint {
    /// Resolve raw constraints into a variant, rejecting zero sizes.
    pub fn resolve(constraints: ResizeConstraints) -> Result<Self, InvalidDimension> {
        let ResizeConstraints {
            width,
            height,
            cover,
        } = constraints;

        if width == Some(0) {
            return Err(InvalidDimension::new("width", 0));
        }
        if height == Some(0) {
            return Err(InvalidDimension::new("height", 0));
        }

        Ok(match (width, height) {
            (None, None) => Constraint::Natural,
            (Some(w), None) => Constraint::WidthOnly(w),
            (None, Some(h)) => Constraint::HeightOnly(h),
            (Some(width), Some(height)) => Constraint::Both {
                width,
                height,
                cover,
            },
        })
    }
}

/// Source-pixel region sampled in cover mode.
///
/// Always lies within `[0, natural.width] x [0, natural.height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Result of dimension planning for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub natural: Dimensions,
    /// Canvas size the resize writes into.
    pub target: Dimensions,
    /// Region of the source to keep before scaling (cover mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRegion>,
}

/// Compute the target canvas (and crop region, for cover mode).
///
/// # Examples
/// ```
/// # use simple_resize::imaging::{Constraint, Dimensions, plan_dimensions};
/// // 800x400 with only a width of 200 → 200x100
/// let plan = plan_dimensions(Dimensions::new(800, 400), Constraint::WidthOnly(200)).unwrap();
/// assert_eq!(plan.target, Dimensions::new(200, 100));
///
/// // 400x800 covered into 200x200 → keep the centered 400x400 square
/// let plan = plan_dimensions(
///     Dimensions::new(400, 800),
///     Constraint::Both { width: 200, height: 200, cover: true },
/// )
/// .unwrap();
/// assert_eq!(plan.target, Dimensions::new(200, 200));
/// assert_eq!(plan.crop.map(|c| (c.y, c.width, c.height)), Some((200, 400, 400)));
/// ```
pub fn plan_dimensions(
    natural: Dimensions,
    constraint: Constraint,
) -> Result<Plan, InvalidDimension> {
    if natural.width == 0 {
        return Err(InvalidDimension::new("natural width", 0));
    }
    if natural.height == 0 {
        return Err(InvalidDimension::new("natural height", 0));
    }

    let (target, crop) = match constraint {
        Constraint::Natural => {
            let h = NATURAL_TARGET_HEIGHT;
            let w = scale_edge(natural.width, h, natural.height, "width")?;
            (Dimensions::new(w, h), None)
        }
        Constraint::Both {
            width,
            height,
            cover,
        } => {
            let target = Dimensions::new(width, height);
            let crop = cover.then(|| calculate_cover_crop(natural, target));
            (target, crop)
        }
        Constraint::WidthOnly(w) => {
            let h = scale_edge(natural.height, w, natural.width, "height")?;
            (Dimensions::new(w, h), None)
        }
        Constraint::HeightOnly(h) => {
            let w = scale_edge(natural.width, h, natural.height, "width")?;
            (Dimensions::new(w, h), None)
        }
    };

    Ok(Plan {
        natural,
        target,
        crop,
    })
}

/// Calculate the centered crop that gives the source the target's aspect ratio.
///
/// A relatively wider source keeps its full height and loses columns on both
/// sides; a relatively taller (or equal) source keeps its full width and loses
/// rows top and bottom.
pub fn calculate_cover_crop(natural: Dimensions, target: Dimensions) -> CropRegion {
    let target_ratio = target.width as f64 / target.height as f64;
    let source_ratio = natural.width as f64 / natural.height as f64;

    if source_ratio > target_ratio {
        let height = natural.height;
        let width = ((height as f64 * target_ratio).round() as u32).clamp(1, natural.width);
        CropRegion {
            x: (natural.width - width) / 2,
            y: 0,
            width,
            height,
        }
    } else {
        let width = natural.width;
        let height = ((width as f64 / target_ratio).round() as u32).clamp(1, natural.height);
        CropRegion {
            x: 0,
            y: (natural.height - height) / 2,
            width,
            height,
        }
    }
}

/// `round(edge * numerator / denominator)`, floored at 1.
fn scale_edge(
    edge: u32,
    numerator: u32,
    denominator: u32,
    axis: &'static str,
) -> Result<u32, InvalidDimension> {
    let scaled = (edge as f64 * numerator as f64 / denominator as f64).round();
    if !scaled.is_finite() || scaled > u32::MAX as f64 {
        return Err(InvalidDimension::new(axis, scaled));
    }
    Ok((scaled as u32).max(1))
}
