//! Example synthesis
//!
//! Produces one representative instance for a schema node. The same walk
//! serves the explain form, where leaves with a description yield the
//! description instead of a value.

use crate::node::{SchemaNode, SchemaType};
use looseapi_common::{DocValue, Result, SpecError};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Example,
    Explain,
}

impl SchemaNode {
    /// Synthesize one example instance of this schema
    ///
    /// # Errors
    /// Returns [`SpecError::UnknownType`] when any reachable node declares a
    /// type tag outside the supported set.
    pub fn build_template(&self) -> Result<Value> {
        synthesize(self, Mode::Example)
    }

    /// Synthesize a template where described leaves show their description
    pub fn build_template_explained(&self) -> Result<Value> {
        synthesize(self, Mode::Explain)
    }
}

fn synthesize(node: &SchemaNode, mode: Mode) -> Result<Value> {
    let schema_type = node.effective_type();

    let value = match schema_type.as_ref() {
        SchemaType::Object => {
            let mut map = Map::new();
            if let Some(properties) = &node.properties {
                for (name, property) in properties {
                    map.insert(name.clone(), synthesize(property, mode)?);
                }
            }
            if node.recursive_ref.is_some() {
                tracing::trace!(name = %node.name, "recursive schema synthesized as empty object");
            }
            Ok(Value::Object(map))
        },
        SchemaType::Array => match &node.items {
            Some(items) => Ok(Value::Array(vec![synthesize(items, mode)?])),
            None => Ok(Value::Array(Vec::new())),
        },
        SchemaType::String => Ok(node
            .enum_values
            .as_ref()
            .and_then(|values| values.first())
            .map(DocValue::to_json)
            .unwrap_or_else(|| Value::String("placeholder".to_string()))),
        SchemaType::Integer | SchemaType::Number => Ok(numeric(node).unwrap_or_else(|| 0.into())),
        SchemaType::Float => Ok(numeric(node).unwrap_or_else(|| Value::from(0.0))),
        SchemaType::Boolean => Ok(Value::Bool(false)),
        SchemaType::Unknown(tag) => Err(SpecError::UnknownType(tag.clone())),
    }?;

    // Described leaves read as prose once the type is known to be valid.
    match &node.description {
        Some(description) if mode == Mode::Explain && !schema_type.is_container() => {
            Ok(Value::String(description.clone()))
        },
        _ => Ok(value),
    }
}

/// `default`, else `minimum`
fn numeric(node: &SchemaNode) -> Option<Value> {
    node.default
        .as_ref()
        .or(node.minimum.as_ref())
        .map(coerce_number)
}

/// Emit numeric text as a JSON number; anything else passes through
fn coerce_number(value: &DocValue) -> Value {
    if let DocValue::String(text) = value {
        let text = text.trim();
        if let Ok(n) = text.parse::<i64>() {
            return Value::Number(n.into());
        }
        if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    value.to_json()
}
