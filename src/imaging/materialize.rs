//! Turning encoded bytes into the representation the caller asked for.
//!
//! | [`OutputKind`] | [`Output`] |
//! |---|---|
//! | `File` | [`NamedFile`] named by [`naming::output_file_name`](crate::naming::output_file_name) |
//! | `Base64` | `data:<mime>;base64,<payload>` string |
//! | `Blob` | the encoded bytes, untouched |

use super::params::{MimeType, OutputKind};
use crate::naming::{NameSource, output_file_name};
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Encoded image bytes with a generated name and content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A finished resize, in exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    File(NamedFile),
    Base64(String),
    Blob(Vec<u8>),
}

impl Output {
    pub fn kind(&self) -> OutputKind {
        match self {
            Output::File(_) => OutputKind::File,
            Output::Base64(_) => OutputKind::Base64,
            Output::Blob(_) => OutputKind::Blob,
        }
    }

    /// Size of the encoded image, before any base64 expansion.
    pub fn encoded_len(&self) -> usize {
        match self {
            Output::File(file) => file.bytes.len(),
            Output::Base64(uri) => {
                let payload = uri.split_once(',').map(|(_, p)| p).unwrap_or("");
                let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
                (payload.len() / 4 * 3).saturating_sub(padding)
            }
            Output::Blob(bytes) => bytes.len(),
        }
    }
}

/// Build a `data:` URI for `bytes`.
pub fn to_data_uri(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Wrap encoded bytes as `kind`.
pub fn materialize(
    bytes: Vec<u8>,
    mime_type: &MimeType,
    kind: OutputKind,
    names: &impl NameSource,
) -> Output {
    match kind {
        OutputKind::File => Output::File(NamedFile {
            name: output_file_name(names, &mime_type.extension),
            content_type: mime_type.mime_type.clone(),
            bytes,
        }),
        OutputKind::Base64 => Output::Base64(to_data_uri(&bytes, &mime_type.mime_type)),
        OutputKind::Blob => Output::Blob(bytes),
    }
}
