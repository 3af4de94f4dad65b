//! Document loading
//!
//! Normalizes either JSON text or indentation-structured text into the same
//! [`DocValue`] shape.

use crate::options::ParseOptions;
use crate::{parse_text, ParseReport};
use looseapi_common::{DocValue, Recovery, Result};
use std::fs;
use std::path::Path;

/// Source format of a loaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Native JSON
    Json,

    /// YAML-like indentation-structured text
    Indented,
}

/// A loaded specification document
#[derive(Debug, Clone)]
pub struct Document {
    root: DocValue,
    format: SourceFormat,
    recoveries: Vec<Recovery>,
}

impl Document {
    /// Load a document from a local file
    ///
    /// Files with a `.json` extension are parsed as JSON; anything else is
    /// sniffed with [`Document::detect_format`].
    ///
    /// # Example
    /// ```rust,ignore
    /// let doc = Document::from_file("petstore.yaml", &ParseOptions::default())?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        tracing::debug!(path = %path.as_ref().display(), "reading spec file");
        let content = fs::read_to_string(path.as_ref())?;

        let is_json = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_text(&content, options)
        }
    }

    /// Load a document from text, detecting JSON by its first character
    pub fn from_text(text: &str, options: &ParseOptions) -> Result<Self> {
        match Self::detect_format(text) {
            SourceFormat::Json => Self::from_json(text),
            SourceFormat::Indented => {
                let ParseReport { value, recoveries } = parse_text(text, options)?;
                Ok(Self {
                    root: value,
                    format: SourceFormat::Indented,
                    recoveries,
                })
            },
        }
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::from_json_value(value))
    }

    /// Wrap an already-parsed JSON value
    pub fn from_json_value(value: serde_json::Value) -> Self {
        Self {
            root: value.into(),
            format: SourceFormat::Json,
            recoveries: Vec::new(),
        }
    }

    /// Wrap an existing document value
    pub fn from_value(root: DocValue) -> Self {
        Self {
            root,
            format: SourceFormat::Json,
            recoveries: Vec::new(),
        }
    }

    /// Guess the format of raw text
    pub fn detect_format(text: &str) -> SourceFormat {
        match text.trim_start().chars().next() {
            Some('{') | Some('[') => SourceFormat::Json,
            _ => SourceFormat::Indented,
        }
    }

    pub fn root(&self) -> &DocValue {
        &self.root
    }

    pub fn into_root(self) -> DocValue {
        self.root
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Structural recoveries made while parsing (always empty for JSON)
    pub fn recoveries(&self) -> &[Recovery] {
        &self.recoveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use looseapi_common::SpecError;

    #[test]
    fn test_detect_format() {
        assert_eq!(Document::detect_format("  {\"a\": 1}"), SourceFormat::Json);
        assert_eq!(Document::detect_format("[1, 2]"), SourceFormat::Json);
        assert_eq!(Document::detect_format("openapi: 3.0.0"), SourceFormat::Indented);
        assert_eq!(Document::detect_format(""), SourceFormat::Indented);
    }

    #[test]
    fn test_invalid_json_is_json_error() {
        let result = Document::from_text("{\"openapi\": ", &ParseOptions::default());
        assert!(matches!(result, Err(SpecError::Json(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Document::from_file("/nonexistent/spec.yaml", &ParseOptions::default());
        match result {
            Err(SpecError::Io(err)) => assert_eq!(err.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
