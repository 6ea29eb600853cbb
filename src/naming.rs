//! Generated names for file outputs.
//!
//! Every `file` output is named `image-<millis>-<suffix>.<extension>`, where
//! `<millis>` is the current Unix time in milliseconds and `<suffix>` is six
//! random base36 characters:
//!
//! ```text
//! image-1718031256042-k3x9qa.webp
//! ```
//!
//! Time and randomness come from a [`NameSource`] so tests (and callers that
//! need reproducible names) can pin both.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Leading component of every generated name.
pub const NAME_PREFIX: &str = "image";

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 6;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Clock and randomness for output names.
pub trait NameSource: Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u128;

    /// A fresh [`SUFFIX_LEN`]-character base36 suffix.
    fn random_suffix(&self) -> String;
}

/// Wall clock + thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNames;

impl NameSource for SystemNames {
    fn now_millis(&self) -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
    }

    fn random_suffix(&self) -> String {
        random_base36(&mut rand::thread_rng(), SUFFIX_LEN)
    }
}

/// A pinned clock and suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedNames {
    pub millis: u128,
    pub suffix: String,
}

impl NameSource for FixedNames {
    fn now_millis(&self) -> u128 {
        self.millis
    }

    fn random_suffix(&self) -> String {
        self.suffix.clone()
    }
}

/// `len` random characters from `[0-9a-z]`.
pub fn random_base36(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Build an output file name for the given extension.
pub fn output_file_name(names: &impl NameSource, extension: &str) -> String {
    format!(
        "{}-{}-{}.{}",
        NAME_PREFIX,
        names.now_millis(),
        names.random_suffix(),
        extension
    )
}
