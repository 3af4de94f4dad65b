//! Schema graph construction
//!
//! Converts raw document fragments into [`SchemaNode`] trees. References are
//! resolved against the document root and copied into the tree as they are
//! met; `allOf` lists are built fragment by fragment and merged.

use crate::node::{Required, SchemaNode, SchemaType};
use crate::pointer::resolve_pointer;
use indexmap::IndexMap;
use looseapi_common::{DocValue, Result, SpecError};
use std::borrow::Cow;

/// One step on the path from the fragment being built down to the current
/// position
#[derive(Debug, Clone)]
enum Trail {
    /// Expanding the reference with this pointer
    Reference(String),

    /// Descended into `properties`, `items`, or another nested keyword
    Descent,
}

/// Builds schema nodes against one document root
///
/// # Example
/// ```
/// use looseapi_common::DocValue;
/// use looseapi_schema::SchemaBuilder;
/// use serde_json::json;
///
/// let root = DocValue::from(json!({
///     "components": {"schemas": {"Id": {"type": "integer", "minimum": 1}}}
/// }));
/// let mut builder = SchemaBuilder::new(&root);
/// let node = builder.build_ref("#/components/schemas/Id").unwrap();
/// assert_eq!(node.build_template().unwrap(), json!(1));
/// ```
pub struct SchemaBuilder<'a> {
    root: &'a DocValue,
    trail: Vec<Trail>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(root: &'a DocValue) -> Self {
        Self {
            root,
            trail: Vec::new(),
        }
    }

    /// Build the schema found at `pointer`
    pub fn build_ref(&mut self, pointer: &str) -> Result<SchemaNode> {
        let name = pointer.rsplit('/').next().unwrap_or(pointer).to_string();
        self.expand_reference(&name, pointer)
    }

    /// Build a schema node from a raw fragment
    ///
    /// The fragment may be a map, a `$ref` map, a flattened `"key: value"`
    /// string, or null (an empty schema).
    pub fn build(&mut self, name: &str, fragment: &DocValue) -> Result<SchemaNode> {
        let map = normalize_fragment(name, fragment)?;

        if let Some(pointer) = reference_of(&map)? {
            return self.expand_reference(name, &pointer);
        }

        let mut node = SchemaNode::named(name);
        let mut compositions: Vec<&DocValue> = Vec::new();

        for (key, value) in map.iter() {
            if key == "allOf" {
                compositions.push(value);
            } else {
                self.set_attribute(&mut node, key, value)?;
            }
        }

        // Own keywords are set first so composed fragments only fill gaps.
        for value in compositions {
            self.compose(&mut node, value)?;
        }

        Ok(node)
    }

    fn expand_reference(&mut self, name: &str, pointer: &str) -> Result<SchemaNode> {
        if let Some(start) = self.reentry_point(pointer) {
            let descended = self.trail[start..]
                .iter()
                .any(|step| matches!(step, Trail::Descent));

            if !descended {
                let mut chain: Vec<String> = self.trail[start..]
                    .iter()
                    .filter_map(|step| match step {
                        Trail::Reference(p) => Some(p.clone()),
                        Trail::Descent => None,
                    })
                    .collect();
                chain.push(pointer.to_string());
                return Err(SpecError::CompositionCycle { chain });
            }

            tracing::debug!(pointer, name, "recursive reference kept as a leaf");
            return Ok(SchemaNode::recursive(name, pointer));
        }

        let target = resolve_pointer(self.root, pointer)?;

        self.trail.push(Trail::Reference(pointer.to_string()));
        let result = self.build(name, target);
        self.trail.pop();
        result
    }

    /// Position of `pointer` on the trail if it is already being expanded
    fn reentry_point(&self, pointer: &str) -> Option<usize> {
        self.trail
            .iter()
            .rposition(|step| matches!(step, Trail::Reference(p) if p == pointer))
    }

    fn descend(&mut self, name: &str, fragment: &DocValue) -> Result<SchemaNode> {
        self.trail.push(Trail::Descent);
        let result = self.build(name, fragment);
        self.trail.pop();
        result
    }

    fn set_attribute(&mut self, node: &mut SchemaNode, key: &str, value: &DocValue) -> Result<()> {
        match key {
            "type" => match type_tag(value) {
                Some(tag) => node.schema_type = Some(SchemaType::from_tag(&tag)),
                None => {
                    node.extra.insert(key.to_string(), value.clone());
                },
            },
            "properties" => node.properties = Some(self.build_properties(value)?),
            "items" => node.items = Some(Box::new(self.descend("items", value)?)),
            "enum" => {
                node.enum_values = Some(match value {
                    DocValue::List(values) => values.clone(),
                    other => vec![other.clone()],
                })
            },
            "default" => node.default = Some(value.clone()),
            "minimum" => node.minimum = Some(value.clone()),
            "description" if !matches!(value, DocValue::Map(_)) => {
                node.description = value
                    .scalar_text()
                    .filter(|text| !text.is_empty())
                    .map(Cow::into_owned);
            },
            "required" => match required_of(value) {
                Some(required) => node.required = Some(required),
                None => {
                    node.extra.insert(key.to_string(), value.clone());
                },
            },
            _ => match value {
                DocValue::Map(_) => {
                    let child = self.descend(key, value)?;
                    node.nested.insert(key.to_string(), child);
                },
                other => {
                    node.extra.insert(key.to_string(), other.clone());
                },
            },
        }
        Ok(())
    }

    fn build_properties(&mut self, value: &DocValue) -> Result<IndexMap<String, SchemaNode>> {
        match value {
            DocValue::Map(entries) => {
                let mut properties = IndexMap::new();
                for (name, fragment) in entries {
                    let property = self.descend(name, fragment)?;
                    properties.insert(name.clone(), property);
                }
                Ok(properties)
            },
            DocValue::Null => Ok(IndexMap::new()),
            other => Err(SpecError::InvalidFragment(format!(
                "properties must be a map, found {}",
                other.kind()
            ))),
        }
    }

    /// Merge every fragment of an `allOf` list into `node`, in order
    fn compose(&mut self, node: &mut SchemaNode, value: &DocValue) -> Result<()> {
        let fragments: Vec<&DocValue> = match value {
            DocValue::List(items) => items.iter().collect(),
            other => vec![other],
        };

        for fragment in fragments {
            let part = self.build(&node.name, fragment)?;
            node.merge_from(part);
        }

        Ok(())
    }
}

/// View a fragment as a map.
///
/// A flattened string of `key: value` pairs becomes a map, and null
/// becomes an empty map.
fn normalize_fragment<'f>(
    name: &str,
    fragment: &'f DocValue,
) -> Result<Cow<'f, IndexMap<String, DocValue>>> {
    match fragment {
        DocValue::Map(map) => Ok(Cow::Borrowed(map)),
        DocValue::Null => Ok(Cow::Owned(IndexMap::new())),
        DocValue::String(text) => flattened_pairs(text)
            .map(Cow::Owned)
            .ok_or_else(|| {
                SpecError::InvalidFragment(format!("'{}' is not a schema: {}", name, text))
            }),
        other => Err(SpecError::InvalidFragment(format!(
            "'{}' is not a schema: found {}",
            name,
            other.kind()
        ))),
    }
}

/// Split folded text such as `type: string description: A name` back into
/// its pairs. A token ending in `:` opens a new key; the tokens after it up
/// to the next key form its value.
fn flattened_pairs(text: &str) -> Option<IndexMap<String, DocValue>> {
    let mut pairs: IndexMap<String, DocValue> = IndexMap::new();
    let mut key: Option<&str> = None;
    let mut words: Vec<&str> = Vec::new();

    for token in text.split_whitespace() {
        match token.strip_suffix(':') {
            Some(next) if !next.is_empty() => {
                if let Some(key) = key {
                    pairs.insert(key.to_string(), flattened_value(&words));
                }
                key = Some(next);
                words.clear();
            },
            _ => {
                key?;
                words.push(token);
            },
        }
    }

    pairs.insert(key?.to_string(), flattened_value(&words));
    Some(pairs)
}

fn flattened_value(words: &[&str]) -> DocValue {
    let joined = words.join(" ");
    let unquoted = joined
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| joined.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(&joined);
    if unquoted.is_empty() {
        DocValue::Null
    } else {
        DocValue::string(unquoted)
    }
}

/// The `$ref` pointer of a fragment, if it has one
fn reference_of(map: &IndexMap<String, DocValue>) -> Result<Option<String>> {
    match map.get("$ref") {
        None => Ok(None),
        Some(DocValue::String(pointer)) => Ok(Some(pointer.trim().to_string())),
        Some(other) => Err(SpecError::InvalidFragment(format!(
            "$ref must be a string, found {}",
            other.kind()
        ))),
    }
}

/// Type tag of a `type` value. A list (`[string, "null"]`) yields its first
/// non-null entry.
fn type_tag(value: &DocValue) -> Option<String> {
    match value {
        DocValue::String(tag) => Some(tag.clone()),
        DocValue::List(tags) => tags
            .iter()
            .filter_map(DocValue::as_str)
            .find(|tag| *tag != "null")
            .map(str::to_string),
        _ => None,
    }
}

fn required_of(value: &DocValue) -> Option<Required> {
    match value {
        DocValue::List(names) => Some(Required::Properties(
            names
                .iter()
                .filter_map(|name| name.scalar_text().map(Cow::into_owned))
                .collect(),
        )),
        other => other.as_bool().map(Required::Flag),
    }
}
