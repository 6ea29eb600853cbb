//! Shared types used across the pipeline, the CLI, and the run report.

use crate::imaging::Plan;
use serde::Serialize;
use std::path::Path;

/// An input image: a display name plus the raw (still encoded) bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, naming it by its path.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::new(path.to_string_lossy(), bytes))
    }

    /// File name without directories or extension, for naming blob outputs.
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
    }
}

/// One line of the run report written with `--manifest`.
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    /// Where the result went: an output path, or `"stdout"` for base64.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_directories_and_extension() {
        let file = InputFile::new("photos/2024/001-dawn.jpg", Vec::new());
        assert_eq!(file.stem(), "001-dawn");
    }

    #[test]
    fn stem_falls_back_for_empty_name() {
        assert_eq!(InputFile::new("", Vec::new()).stem(), "image");
    }

    #[test]
    fn read_uses_path_as_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let file = InputFile::read(&path).unwrap();
        assert_eq!(file.name, path.to_string_lossy());
        assert_eq!(file.bytes, b"not really a png");
    }

    #[test]
    fn report_skips_empty_fields() {
        let report = ImageReport {
            input: "a.png".into(),
            plan: None,
            destination: None,
            encoded_bytes: None,
            error: Some("Decode failed: bad".into()),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"input":"a.png","error":"Decode failed: bad"}"#);
    }
}
