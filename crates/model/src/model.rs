//! API model over a loaded document

use crate::operation::{names_of, parameters_of, text_of, Operation, HTTP_METHODS};
use looseapi_common::{DocValue, Result, SpecError};
use looseapi_parser::{Document, ParseOptions};
use looseapi_schema::{resolve_pointer, schema_at, SchemaNode};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Options controlling how operations are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    /// Path segments left out of derived operation ids (version and
    /// service prefixes such as `v3`)
    pub skip_path_segments: Vec<String>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            skip_path_segments: vec!["v3".to_string(), "sd".to_string(), "sp".to_string()],
        }
    }
}

impl ModelOptions {
    /// Also skip `segment` when deriving operation ids
    pub fn with_skip_segment(mut self, segment: impl Into<String>) -> Self {
        self.skip_path_segments.push(segment.into());
        self
    }

    /// Replace the skipped segments
    pub fn with_skip_segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_path_segments = segments.into_iter().map(Into::into).collect();
        self
    }
}

/// An API document with its operations indexed
pub struct ApiModel {
    document: Document,
    title: String,
    tags: Vec<String>,
    operations: Vec<Operation>,
}

impl ApiModel {
    /// Build a model with default options
    pub fn from_document(document: Document) -> Result<Self> {
        Self::with_options(document, &ModelOptions::default())
    }

    /// Load a document from disk and build its model
    pub fn from_file<P: AsRef<Path>>(path: P, parse_options: &ParseOptions) -> Result<Self> {
        Self::from_document(Document::from_file(path, parse_options)?)
    }

    pub fn with_options(document: Document, options: &ModelOptions) -> Result<Self> {
        let root = document.root();

        let title = root
            .get("info")
            .and_then(|info| text_of(info.get("title")))
            .unwrap_or_else(|| "Unknown".to_string());

        let tags = root.get("tags").map(names_of).unwrap_or_default();
        let operations = load_operations(root, options)?;

        tracing::debug!(
            title = %title,
            operations = operations.len(),
            tags = tags.len(),
            "loaded API model"
        );

        Ok(Self {
            document,
            title,
            tags,
            operations,
        })
    }

    /// `info.title`, or `Unknown`
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Names of the top-level tags
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// All operations in path order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn root(&self) -> &DocValue {
        self.document.root()
    }

    /// Operation by id
    pub fn operation(&self, id: &str) -> Result<&Operation> {
        self.operations
            .iter()
            .find(|op| op.operation_id == id)
            .ok_or_else(|| SpecError::lookup(id, &["paths"]))
    }

    /// Operations carrying `tag`
    pub fn operations_for_tag(&self, tag: &str) -> Vec<&Operation> {
        self.operations.iter().filter(|op| op.has_tag(tag)).collect()
    }

    /// Raw document value at `pointer`
    pub fn get_component(&self, pointer: &str) -> Result<&DocValue> {
        resolve_pointer(self.root(), pointer)
    }

    /// Schema built from the fragment at `pointer`
    pub fn schema(&self, pointer: &str) -> Result<SchemaNode> {
        schema_at(self.root(), pointer)
    }
}

impl fmt::Display for ApiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<API model: {}>", self.title)
    }
}

fn load_operations(root: &DocValue, options: &ModelOptions) -> Result<Vec<Operation>> {
    let Some(paths) = root.get("paths").and_then(DocValue::as_map) else {
        return Ok(Vec::new());
    };

    let mut operations = Vec::new();
    let mut seen = HashSet::new();

    for (path, item) in paths {
        let Some(item) = item.as_map() else {
            tracing::debug!(path = %path, "skipping path without operations");
            continue;
        };

        let shared = match item.get("parameters") {
            Some(list) => parameters_of(root, list)?,
            None => Vec::new(),
        };

        for (method, definition) in item {
            if !HTTP_METHODS.contains(&method.to_lowercase().as_str()) {
                continue;
            }

            let operation = Operation::from_value(
                root,
                path,
                method,
                definition,
                &shared,
                &options.skip_path_segments,
            )?;

            if !seen.insert(operation.operation_id.clone()) {
                tracing::warn!(
                    operation_id = %operation.operation_id,
                    path = %path,
                    "duplicate operation id; lookups return the first"
                );
            }
            operations.push(operation);
        }
    }

    Ok(operations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(value: serde_json::Value) -> ApiModel {
        ApiModel::from_document(Document::from_json_value(value)).unwrap()
    }

    #[test]
    fn test_title_defaults_to_unknown() {
        let model = model(json!({"paths": {}}));
        assert_eq!(model.title(), "Unknown");
        assert!(model.operations().is_empty());
        assert_eq!(model.to_string(), "<API model: Unknown>");
    }

    #[test]
    fn test_non_method_keys_are_skipped() {
        let model = model(json!({"paths": {"/pets": {
            "summary": "Pets",
            "parameters": [{"name": "X-Trace", "in": "header"}],
            "get": {"operationId": "listPets"},
            "x-internal": {"get": {}}
        }}}));

        assert_eq!(model.operations().len(), 1);
        let operation = model.operation("listPets").unwrap();
        assert_eq!(operation.headers().len(), 1);
    }

    #[test]
    fn test_missing_operation_is_lookup_error() {
        let model = model(json!({"paths": {"/pets": {"get": {}}}}));
        match model.operation("deletePets") {
            Err(SpecError::Lookup { segment, walked }) => {
                assert_eq!(segment, "deletePets");
                assert_eq!(walked, "#/paths");
            },
            other => panic!("expected lookup error, got {:?}", other.map(|op| op.to_string())),
        }
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first() {
        let model = model(json!({"paths": {
            "/v3/pets": {"get": {"summary": "first"}},
            "/sd/pets": {"get": {"summary": "second"}}
        }}));
        assert_eq!(model.operations().len(), 2);
        assert_eq!(model.operation("get_pets").unwrap().about(), Some("first"));
    }

    #[test]
    fn test_custom_skip_segments() {
        let document = Document::from_json_value(json!({"paths": {"/api/v1/pets": {"get": {}}}}));
        let options = ModelOptions::default().with_skip_segments(["api", "v1"]);
        let model = ApiModel::with_options(document, &options).unwrap();
        assert!(model.operation("get_pets").is_ok());
    }
}
