//! Tolerant parsing of YAML-like API specification documents
//!
//! Specification documents written by hand rarely survive a strict YAML
//! parser: indentation drifts, block scalars are sometimes marked and
//! sometimes not, and Windows line endings leak in. This crate reads such
//! text line by line and rebuilds the document structure from indentation
//! alone.
//!
//! ## Pipeline
//! 1. [`LineRecord::classify`] records each non-blank line's depth, list
//!    marker, and block-scalar status.
//! 2. The structural parser places every line under its parent by depth and
//!    folds the result into a [`DocValue`].
//!
//! Malformed structure is never fatal. Each repair is logged with `tracing`
//! and returned as a [`Recovery`] in the [`ParseReport`]; with
//! [`ParseOptions::strict`] the first repair becomes an error instead.
//!
//! ## Usage
//! ```rust,ignore
//! use looseapi_parser::{Document, ParseOptions};
//!
//! let doc = Document::from_file("petstore.yaml", &ParseOptions::default())?;
//! println!("{:?}", doc.root().get("info"));
//! ```
//!
//! Full YAML (anchors, flow collections, multiple documents) is out of scope;
//! flow syntax such as `[a, b]` is kept as a plain string.

mod document;
mod line;
mod options;
mod tree;

pub use document::{Document, SourceFormat};
pub use line::{is_block_indicator, LineRecord, LineShape};
pub use options::{BlockScalarPolicy, ParseOptions};

use looseapi_common::{DocValue, Recovery, Result, SpecError};
use tree::ParseTree;

/// Output of a structural parse
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    /// Parsed document
    pub value: DocValue,

    /// Repairs made along the way, in the order they happened
    pub recoveries: Vec<Recovery>,
}

/// Classify every non-blank line of `text`
pub fn classify_lines(text: &str, options: &ParseOptions) -> Vec<LineRecord> {
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| LineRecord::classify(index + 1, line, &options.block_scalars))
        .collect()
}

/// Parse indentation-structured text into a document value
///
/// # Example
/// ```
/// use looseapi_parser::{parse_text, ParseOptions};
///
/// let report = parse_text("info:\n  title: Pets\n", &ParseOptions::default()).unwrap();
/// assert_eq!(
///     report
///         .value
///         .get("info")
///         .and_then(|info| info.get("title"))
///         .and_then(|title| title.as_str()),
///     Some("Pets")
/// );
/// ```
pub fn parse_text(text: &str, options: &ParseOptions) -> Result<ParseReport> {
    let records = classify_lines(text, options);
    parse_lines(&records, options)
}

/// Parse already-classified lines into a document value
pub fn parse_lines(records: &[LineRecord], options: &ParseOptions) -> Result<ParseReport> {
    let mut recoveries = Vec::new();
    let tree = ParseTree::build(records, &mut recoveries);
    let value = tree.into_value(&mut recoveries);

    if options.strict {
        if let Some(first) = recoveries.into_iter().next() {
            return Err(SpecError::StructuralAmbiguity(first));
        }
        return Ok(ParseReport {
            value,
            recoveries: Vec::new(),
        });
    }

    tracing::debug!(
        lines = records.len(),
        recoveries = recoveries.len(),
        "parsed indented document"
    );

    Ok(ParseReport { value, recoveries })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_skipped_but_numbered() {
        let records = classify_lines("a:\n\n  \r\n  b: 1\n", &ParseOptions::default());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].line_number, 4);
    }

    #[test]
    fn test_strict_mode_rejects_recoveries() {
        let options = ParseOptions::default().strict(true);
        let result = parse_text("a:\n    b: 1\n  c: 2\n", &options);
        assert!(matches!(result, Err(SpecError::StructuralAmbiguity(_))));
    }

    #[test]
    fn test_strict_mode_accepts_clean_input() {
        let options = ParseOptions::default().strict(true);
        let report = parse_text("a:\n  b: 1\n", &options).unwrap();
        assert!(report.recoveries.is_empty());
    }
}
