//! Schema resolution and example synthesis
//!
//! This crate walks a parsed API document, resolves local `$ref` pointers,
//! merges `allOf` compositions, and synthesizes representative instances.
//!
//! # Example
//! ```
//! use looseapi_common::DocValue;
//! use looseapi_schema::schema_at;
//! use serde_json::json;
//!
//! let root = DocValue::from(json!({"components": {"schemas": {
//!     "Base": {"type": "object", "properties": {"id": {"type": "integer", "minimum": 1}}},
//!     "Pet": {"allOf": [
//!         {"$ref": "#/components/schemas/Base"},
//!         {"properties": {"name": {"type": "string"}}}
//!     ]}
//! }}}));
//!
//! let pet = schema_at(&root, "#/components/schemas/Pet").unwrap();
//! assert_eq!(pet.build_template().unwrap(), json!({"id": 1, "name": "placeholder"}));
//! ```

pub mod builder;
pub mod node;
pub mod pointer;
pub mod template;

pub use builder::SchemaBuilder;
pub use node::{Attribute, Required, SchemaNode, SchemaType};
pub use pointer::{decode_segment, resolve_pointer};

use looseapi_common::{DocValue, Result};

/// Resolve `pointer` and return the raw document value found there
pub fn get_component<'a>(root: &'a DocValue, pointer: &str) -> Result<&'a DocValue> {
    resolve_pointer(root, pointer)
}

/// Resolve `pointer` and build the schema found there
pub fn schema_at(root: &DocValue, pointer: &str) -> Result<SchemaNode> {
    SchemaBuilder::new(root).build_ref(pointer)
}

/// Build a schema node from an inline fragment of `root`
pub fn build_schema(root: &DocValue, name: &str, fragment: &DocValue) -> Result<SchemaNode> {
    SchemaBuilder::new(root).build(name, fragment)
}
