//! Resize configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Configuration is
//! layered: stock defaults are overridden by a user `config.toml`, which is in
//! turn overridden by command-line flags.
//!
//! ```text
//! stock defaults  <  config.toml  <  CLI flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resize]
//! # width = 800             # Target width in pixels (omit to derive from height)
//! # height = 600            # Target height in pixels (omit to derive from width)
//! cover = false             # With both width and height: center-crop instead of stretch
//!
//! [output]
//! format = "webp"           # png | jpeg | webp
//! quality = 1.0             # Encoding quality in (0, 1]
//! kind = "file"             # file | base64 | blob
//!
//! [processing]
//! # max_processes = 4       # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! With neither width nor height, images are scaled to a height of 100px.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{MimeType, OutputKind, Quality, ResizeOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Target dimensions and aspect handling.
    pub resize: ResizeSettings,
    /// Output format, quality, and representation.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ResizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize.width == Some(0) {
            return Err(ConfigError::Validation(
                "resize.width must be positive".into(),
            ));
        }
        if self.resize.height == Some(0) {
            return Err(ConfigError::Validation(
                "resize.height must be positive".into(),
            ));
        }
        let q = self.output.quality;
        if !(q.is_finite() && q > 0.0 && q <= 1.0) {
            return Err(ConfigError::Validation(
                "output.quality must be in (0, 1]".into(),
            ));
        }
        if MimeType::from_name(&self.output.format).is_none() {
            return Err(ConfigError::Validation(format!(
                "output.format must be png, jpeg or webp (got {:?})",
                self.output.format
            )));
        }
        Ok(())
    }

    /// Library options for this config. Assumes [`validate`](Self::validate) passed.
    pub fn to_options(&self) -> ResizeOptions {
        ResizeOptions {
            width: self.resize.width,
            height: self.resize.height,
            cover: self.resize.cover,
            mime_type: MimeType::from_name(&self.output.format).unwrap_or_default(),
            quality: Quality::new(self.output.quality),
            output: self.output.kind,
        }
    }
}

/// Target dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Only used when both `width` and `height` are set.
    pub cover: bool,
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Short format name: `png`, `jpeg` (or `jpg`), `webp`.
    pub format: String,
    /// Encoding quality in `(0, 1]`. Used by JPEG and WebP; PNG is lossless.
    pub quality: f32,
    pub kind: OutputKind,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "webp".to_string(),
            quality: 1.0,
            kind: OutputKind::File,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ResizeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<ResizeConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<ResizeConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Resize Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Target dimensions
# ---------------------------------------------------------------------------
[resize]
# Width only:        height follows the source aspect ratio.
# Height only:       width follows the source aspect ratio.
# Width and height:  exact canvas; stretched unless `cover` is set.
# Neither:           scaled to a height of 100px.
# width = 800
# height = 600

# With both width and height, center-crop the source to the target aspect
# ratio before scaling instead of stretching it.
cover = false

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Encoding format: "png", "jpeg" or "webp".
format = "webp"

# Encoding quality in (0, 1] for JPEG and WebP. PNG is always lossless.
quality = 1.0

# What to produce for each image:
#   "file"   - write image-<millis>-<random>.<ext> into the output directory
#   "base64" - print a data: URI to stdout
#   "blob"   - write the raw bytes as <input name>.<ext> into the output directory
kind = "file"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
