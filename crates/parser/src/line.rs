//! Line classification
//!
//! Turns a single raw line into a [`LineRecord`]. Classification never fails:
//! a line that fits no known shape is simply a bare scalar.

use crate::options::BlockScalarPolicy;
use once_cell::sync::Lazy;
use regex::Regex;

/// `key:` or `key: value`, where the key is bare (no whitespace or colon) or
/// quoted. The colon must be followed by whitespace or the end of the line, so
/// URLs such as `http://host` stay scalars.
static KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:"([^"]*)"|'([^']*)'|([^\s:"'][^\s:]*)):(?:\s+(.*))?$"#).unwrap()
});

/// Markers that turn the rest of an entry into a block scalar
const BLOCK_INDICATORS: &[&str] = &["|", "|-", "|+", ">", ">-", ">+"];

/// One classified line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// 1-based line number in the source text
    pub line_number: usize,

    /// Leading spaces plus the width of a `- ` list marker
    pub depth: usize,

    /// Line content with surrounding whitespace (and carriage returns) removed
    pub raw: String,

    /// Line starts with `- `
    pub is_list_item: bool,

    /// Line opens a block scalar
    pub is_block_scalar: bool,
}

/// Syntactic shape of a line's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape {
    /// `key:` with nothing after the colon
    Key(String),

    /// `key: value`
    Pair(String, String),

    /// Anything else
    Scalar(String),
}

impl LineShape {
    fn parse(text: &str) -> Self {
        let Some(caps) = KEY_REGEX.captures(text) else {
            return LineShape::Scalar(unquote(text).to_string());
        };

        let key = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default()
            .to_string();

        match caps.get(4).map(|m| m.as_str().trim()) {
            Some(value) if !value.is_empty() => LineShape::Pair(key, unquote(value).to_string()),
            _ => LineShape::Key(key),
        }
    }
}

impl LineRecord {
    /// Classify one raw line
    pub fn classify(line_number: usize, line: &str, policy: &BlockScalarPolicy) -> Self {
        let unindented = line.trim_start_matches(' ');
        let mut depth = line.len() - unindented.len();
        if unindented.starts_with("- ") {
            depth += 2;
        }

        let raw = line.trim().to_string();
        let is_list_item = raw.starts_with("- ");

        let mut record = Self {
            line_number,
            depth,
            raw,
            is_list_item,
            is_block_scalar: false,
        };

        record.is_block_scalar = match record.shape() {
            LineShape::Key(key) => policy.is_implicit(&key),
            LineShape::Pair(key, value) => is_block_indicator(&value) || policy.is_implicit(&key),
            LineShape::Scalar(_) => false,
        };

        record
    }

    /// Content without the list marker
    pub fn body(&self) -> &str {
        if self.is_list_item {
            self.raw[2..].trim_start()
        } else {
            &self.raw
        }
    }

    /// Parse the body into its key/value shape
    pub fn shape(&self) -> LineShape {
        LineShape::parse(self.body())
    }

    /// Key and inline text of a block scalar line. The inline text excludes
    /// block indicators.
    pub(crate) fn block_head(&self) -> (String, Option<String>) {
        match self.shape() {
            LineShape::Key(key) => (key, None),
            LineShape::Pair(key, value) if is_block_indicator(&value) => (key, None),
            LineShape::Pair(key, value) => (key, Some(value)),
            LineShape::Scalar(text) => (text, None),
        }
    }
}

/// Whether a value is one of the block scalar markers
pub fn is_block_indicator(value: &str) -> bool {
    BLOCK_INDICATORS.contains(&value)
}

/// Strip one pair of matching surrounding quotes
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
