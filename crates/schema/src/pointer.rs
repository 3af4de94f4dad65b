//! Reference resolution
//!
//! Resolves local pointers such as `#/components/schemas/Pet` against a
//! document root. Only in-document references are supported.

use looseapi_common::{DocValue, Result, SpecError};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Resolve `pointer` against `root`
///
/// Accepts `#/a/b`, `/a/b`, or bare `a/b`. Empty and `#` segments are
/// ignored. A `components` segment is skipped when the current map has no
/// `components` key, so the same pointer works against a whole document or
/// against its `components` section. Numeric segments index into lists.
///
/// # Example
/// ```
/// use looseapi_common::DocValue;
/// use looseapi_schema::resolve_pointer;
/// use serde_json::json;
///
/// let root = DocValue::from(json!({"components": {"schemas": {"Pet": {"type": "object"}}}}));
/// let pet = resolve_pointer(&root, "#/components/schemas/Pet").unwrap();
/// assert_eq!(pet.to_json(), json!({"type": "object"}));
/// ```
pub fn resolve_pointer<'a>(root: &'a DocValue, pointer: &str) -> Result<&'a DocValue> {
    let mut current = root;
    let mut walked: Vec<String> = Vec::new();

    for raw in pointer.trim().split('/') {
        if raw.is_empty() || raw == "#" {
            continue;
        }
        let segment = decode_segment(raw);

        let next = match current {
            DocValue::Map(map) => match map.get(segment.as_ref()) {
                Some(next) => next,
                None if segment == "components" => continue,
                None => return Err(SpecError::lookup(segment, &walked)),
            },
            DocValue::List(items) => match segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                Some(next) => next,
                None => return Err(SpecError::lookup(segment, &walked)),
            },
            _ => return Err(SpecError::lookup(segment, &walked)),
        };

        walked.push(segment.into_owned());
        current = next;
    }

    Ok(current)
}

/// Decode one pointer segment: percent-encoding first, then `~1` and `~0`
pub fn decode_segment(raw: &str) -> Cow<'_, str> {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    if decoded.contains('~') {
        Cow::Owned(decoded.replace("~1", "/").replace("~0", "~"))
    } else {
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root() -> DocValue {
        DocValue::from(json!({
            "components": {
                "schemas": {
                    "Pet": {"type": "object"},
                    "a/b": {"type": "string"},
                    "Tags": {"enum": ["x", "y"]}
                }
            }
        }))
    }

    #[test]
    fn test_resolves_component() {
        let root = root();
        let found = resolve_pointer(&root, "#/components/schemas/Pet").unwrap();
        assert_eq!(found.to_json(), json!({"type": "object"}));
    }

    #[test]
    fn test_bare_path() {
        let root = root();
        let found = resolve_pointer(&root, "components/schemas/Pet").unwrap();
        assert_eq!(found.to_json(), json!({"type": "object"}));
    }

    #[test]
    fn test_components_segment_is_skippable() {
        let root = root();
        let components = root.get("components").unwrap();
        let found = resolve_pointer(components, "#/components/schemas/Pet").unwrap();
        assert_eq!(found.to_json(), json!({"type": "object"}));
    }

    #[test]
    fn test_missing_segment() {
        let root = root();
        match resolve_pointer(&root, "#/components/schemas/Missing") {
            Err(SpecError::Lookup { segment, walked }) => {
                assert_eq!(segment, "Missing");
                assert_eq!(walked, "#/components/schemas");
            },
            other => panic!("expected lookup error, got {:?}", other),
        }
    }

    #[test]
    fn test_escaped_segments() {
        let root = root();
        assert!(resolve_pointer(&root, "#/components/schemas/a~1b").is_ok());
        assert!(resolve_pointer(&root, "#/components/schemas/a%2Fb").is_ok());
    }

    #[test]
    fn test_list_index() {
        let root = root();
        let found = resolve_pointer(&root, "#/components/schemas/Tags/enum/1").unwrap();
        assert_eq!(found, &DocValue::string("y"));
        assert!(resolve_pointer(&root, "#/components/schemas/Tags/enum/9").is_err());
    }

    #[test]
    fn test_empty_pointer_is_root() {
        let root = root();
        assert_eq!(resolve_pointer(&root, "#").unwrap(), &root);
    }
}
