//! Normalized document value

use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Cow;

/// A parsed document, independent of its source format
///
/// The indentation parser only produces `String`, `List`, and `Map` values
/// (plus `Null` for an empty block scalar). Documents loaded from JSON keep
/// their native booleans and numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum DocValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<DocValue>),
    Map(IndexMap<String, DocValue>),
}

impl DocValue {
    /// Build a single-entry map
    pub fn pair(key: impl Into<String>, value: DocValue) -> Self {
        let mut map = IndexMap::new();
        map.insert(key.into(), value);
        DocValue::Map(map)
    }

    /// Build a string scalar
    pub fn string(s: impl Into<String>) -> Self {
        DocValue::String(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DocValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, DocValue>> {
        match self {
            DocValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DocValue]> {
        match self {
            DocValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key when this value is a map
    pub fn get(&self, key: &str) -> Option<&DocValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Render a scalar as text; `None` for maps and lists
    pub fn scalar_text(&self) -> Option<Cow<'_, str>> {
        match self {
            DocValue::Null => Some(Cow::Borrowed("")),
            DocValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            DocValue::Number(n) => Some(Cow::Owned(n.to_string())),
            DocValue::String(s) => Some(Cow::Borrowed(s)),
            DocValue::List(_) | DocValue::Map(_) => None,
        }
    }

    /// Interpret a scalar as a boolean; accepts the strings `true`/`false`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DocValue::Bool(b) => Some(*b),
            DocValue::String(s) => match s.trim() {
                "true" | "True" => Some(true),
                "false" | "False" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            DocValue::Null => "null",
            DocValue::Bool(_) => "boolean",
            DocValue::Number(_) => "number",
            DocValue::String(_) => "string",
            DocValue::List(_) => "list",
            DocValue::Map(_) => "map",
        }
    }

    /// Convert into a `serde_json::Value`, preserving key order
    pub fn to_json(&self) -> serde_json::Value {
        self.clone().into()
    }
}

impl From<serde_json::Value> for DocValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DocValue::Null,
            serde_json::Value::Bool(b) => DocValue::Bool(b),
            serde_json::Value::Number(n) => DocValue::Number(n),
            serde_json::Value::String(s) => DocValue::String(s),
            serde_json::Value::Array(items) => {
                DocValue::List(items.into_iter().map(DocValue::from).collect())
            },
            serde_json::Value::Object(map) => DocValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, DocValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<DocValue> for serde_json::Value {
    fn from(value: DocValue) -> Self {
        match value {
            DocValue::Null => serde_json::Value::Null,
            DocValue::Bool(b) => serde_json::Value::Bool(b),
            DocValue::Number(n) => serde_json::Value::Number(n),
            DocValue::String(s) => serde_json::Value::String(s),
            DocValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            },
            DocValue::Map(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<&str> for DocValue {
    fn from(s: &str) -> Self {
        DocValue::String(s.to_string())
    }
}

impl From<String> for DocValue {
    fn from(s: String) -> Self {
        DocValue::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_json_conversion_preserves_order() {
        let source = json!({"zeta": 1, "alpha": [true, null, "x"], "mid": {"b": 2, "a": 1}});
        let value = DocValue::from(source.clone());

        let keys: Vec<&str> = value.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(value.to_json(), source);
    }

    #[test]
    fn test_serialize_untagged() {
        let value = DocValue::pair("name", DocValue::string("Pet"));
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"name":"Pet"}"#);
        assert_eq!(serde_json::to_string(&DocValue::Null).unwrap(), "null");
    }

    #[test]
    fn test_scalar_helpers() {
        assert_eq!(DocValue::string("true").as_bool(), Some(true));
        assert_eq!(DocValue::Bool(false).as_bool(), Some(false));
        assert_eq!(DocValue::string("maybe").as_bool(), None);
        assert_eq!(
            DocValue::Number(5.into()).scalar_text().as_deref(),
            Some("5")
        );
        assert!(DocValue::List(vec![]).scalar_text().is_none());
        assert_eq!(DocValue::Map(IndexMap::new()).kind(), "map");
    }
}
