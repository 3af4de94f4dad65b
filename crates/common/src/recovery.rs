//! Records of structural repairs made by the tolerant parser

use std::fmt;

/// A deterministic repair applied to malformed input
///
/// The parser never aborts on bad indentation. Each time it has to guess,
/// it records what it did so callers can surface or reject the guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    /// 1-based source line that triggered the repair
    pub line: usize,

    /// What was repaired
    pub kind: RecoveryKind,
}

/// Kinds of structural repair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryKind {
    /// A dedent landed between a node's depth and its children's depth;
    /// the line was adopted as a direct child of that node
    MisalignedIndent {
        depth: usize,
        parent_depth: Option<usize>,
        group_depth: usize,
    },

    /// A non-list line appeared inside a list block. `merged` is true when it
    /// was folded into the previous element, false when appended on its own
    StrayListContinuation { merged: bool },

    /// Two children of one mapping produced the same key; the later one won
    DuplicateKey { key: String },

    /// A bare scalar appeared among mapping entries; it became a key with a
    /// null value
    ScalarInMapping { text: String },

    /// A `key:` shaped line under a `key: value` line; it was folded into
    /// the value as text
    FoldedEntry { key: String },
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl fmt::Display for RecoveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryKind::MisalignedIndent {
                depth,
                parent_depth,
                group_depth,
            } => match parent_depth {
                Some(parent) => write!(
                    f,
                    "indent {} falls between parent indent {} and sibling indent {}",
                    depth, parent, group_depth
                ),
                None => write!(
                    f,
                    "indent {} is shallower than the first top-level line ({})",
                    depth, group_depth
                ),
            },
            RecoveryKind::StrayListContinuation { merged: true } => {
                write!(f, "non-list line merged into the previous list item")
            },
            RecoveryKind::StrayListContinuation { merged: false } => {
                write!(f, "non-list line appended to the list as its own item")
            },
            RecoveryKind::DuplicateKey { key } => {
                write!(f, "duplicate key '{}' (last value kept)", key)
            },
            RecoveryKind::ScalarInMapping { text } => {
                write!(f, "scalar '{}' inside a mapping kept as a null-valued key", text)
            },
            RecoveryKind::FoldedEntry { key } => {
                write!(f, "entry '{}:' under a scalar value folded into its text", key)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line() {
        let recovery = Recovery {
            line: 7,
            kind: RecoveryKind::DuplicateKey {
                key: "type".to_string(),
            },
        };
        assert_eq!(
            recovery.to_string(),
            "line 7: duplicate key 'type' (last value kept)"
        );
    }

    #[test]
    fn test_display_folded_entry() {
        let kind = RecoveryKind::FoldedEntry {
            key: "in".to_string(),
        };
        assert_eq!(
            kind.to_string(),
            "entry 'in:' under a scalar value folded into its text"
        );
    }
}
