//! Common types and utilities for looseapi
//!
//! This crate contains the normalized document value shared by the parser,
//! schema, and model crates, together with the error taxonomy and the
//! structural recovery records emitted by the tolerant parser.

mod recovery;
mod value;

pub use recovery::{Recovery, RecoveryKind};
pub use value::DocValue;

use thiserror::Error;

/// Errors that can occur while loading, resolving, or synthesizing
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Lookup error: segment '{segment}' not found after '{walked}'")]
    Lookup { segment: String, walked: String },

    #[error("Composition cycle: {}", .chain.join(" -> "))]
    CompositionCycle { chain: Vec<String> },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Structural ambiguity: {0}")]
    StructuralAmbiguity(Recovery),

    #[error("Invalid schema fragment: {0}")]
    InvalidFragment(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpecError {
    /// Build a lookup error for `segment`, with the segments walked before it
    pub fn lookup<S: AsRef<str>>(segment: impl Into<String>, walked: &[S]) -> Self {
        let walked: Vec<&str> = walked.iter().map(|s| s.as_ref()).collect();
        SpecError::Lookup {
            segment: segment.into(),
            walked: format!("#/{}", walked.join("/")),
        }
    }
}

/// Result type for looseapi operations
pub type Result<T> = std::result::Result<T, SpecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_message() {
        let err = SpecError::lookup("Missing", &["components", "schemas"]);
        assert_eq!(
            err.to_string(),
            "Lookup error: segment 'Missing' not found after '#/components/schemas'"
        );
    }

    #[test]
    fn test_cycle_error_message() {
        let err = SpecError::CompositionCycle {
            chain: vec!["#/a".to_string(), "#/b".to_string(), "#/a".to_string()],
        };
        assert_eq!(err.to_string(), "Composition cycle: #/a -> #/b -> #/a");
    }

    #[test]
    fn test_json_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SpecError = json_err.into();
        assert!(matches!(err, SpecError::Json(_)));
    }
}
