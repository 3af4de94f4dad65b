//! Operations, parameters and request bodies

use indexmap::IndexMap;
use looseapi_common::{DocValue, Result, SpecError};
use looseapi_schema::{build_schema, resolve_pointer, SchemaNode};
use std::borrow::Cow;
use std::fmt;

/// HTTP methods recognized under a path item
pub(crate) const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Where a parameter is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Other(String),
}

impl ParameterLocation {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "path" => ParameterLocation::Path,
            "query" => ParameterLocation::Query,
            "header" => ParameterLocation::Header,
            "cookie" => ParameterLocation::Cookie,
            other => ParameterLocation::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
            ParameterLocation::Other(tag) => tag,
        }
    }
}

/// One operation parameter, with any `$ref` already followed
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,

    /// The `in` keyword
    pub location: Option<ParameterLocation>,

    /// `required`; the strings `"true"` and `"false"` are accepted
    pub required: bool,

    pub description: Option<String>,

    pub schema: Option<SchemaNode>,

    /// Remaining keywords (`style`, `example`, ...)
    pub extra: IndexMap<String, DocValue>,
}

impl Parameter {
    pub(crate) fn from_value(root: &DocValue, value: &DocValue) -> Result<Self> {
        let definition = follow_reference(root, value)?;
        let map = definition.as_map().ok_or_else(|| {
            SpecError::InvalidFragment(format!(
                "parameter must be a map, found {}",
                definition.kind()
            ))
        })?;

        let name = text_of(map.get("name")).unwrap_or_default();
        let mut parameter = Parameter {
            location: text_of(map.get("in")).map(|tag| ParameterLocation::from_tag(&tag)),
            required: map.get("required").and_then(DocValue::as_bool).unwrap_or(false),
            description: text_of(map.get("description")),
            schema: None,
            extra: IndexMap::new(),
            name,
        };

        for (key, value) in map {
            match key.as_str() {
                "name" | "in" | "required" | "description" => {},
                "schema" => parameter.schema = Some(build_schema(root, &parameter.name, value)?),
                _ => {
                    parameter.extra.insert(key.clone(), value.clone());
                },
            }
        }

        Ok(parameter)
    }

    /// Identity used when operation-level parameters override path-level ones
    fn key(&self) -> (&str, Option<&str>) {
        (self.name.as_str(), self.location.as_ref().map(ParameterLocation::as_str))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "<{} parameter: {}>", location.as_str(), self.name),
            None => write!(f, "<parameter: {}>", self.name),
        }
    }
}

/// Request body of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    /// First media type listed under `content`
    pub content_type: Option<String>,

    pub required: bool,

    pub description: Option<String>,

    /// Schema of the first media type
    pub schema: Option<SchemaNode>,
}

impl RequestBody {
    pub(crate) fn from_value(root: &DocValue, value: &DocValue) -> Result<Self> {
        let definition = follow_reference(root, value)?;

        let media = definition
            .get("content")
            .and_then(DocValue::as_map)
            .and_then(|content| content.first());

        let schema = match media.and_then(|(_, media)| media.get("schema")) {
            Some(fragment) => Some(build_schema(root, "schema", fragment)?),
            None => None,
        };

        Ok(RequestBody {
            content_type: media.map(|(content_type, _)| content_type.clone()),
            required: definition
                .get("required")
                .and_then(DocValue::as_bool)
                .unwrap_or(false),
            description: text_of(definition.get("description")),
            schema,
        })
    }

    /// Example payload synthesized from the body schema; null without one
    pub fn template(&self) -> Result<serde_json::Value> {
        match &self.schema {
            Some(schema) => schema.build_template(),
            None => Ok(serde_json::Value::Null),
        }
    }
}

/// One HTTP operation under `paths`
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Lower-case HTTP method
    pub method: String,

    pub path: String,

    /// `operationId`, or a name derived from the method and path
    pub operation_id: String,

    pub summary: Option<String>,

    pub description: Option<String>,

    pub tags: Vec<String>,

    /// Path-level parameters followed by the operation's own
    pub parameters: Vec<Parameter>,

    pub request_body: Option<RequestBody>,
}

impl Operation {
    pub(crate) fn from_value(
        root: &DocValue,
        path: &str,
        method: &str,
        definition: &DocValue,
        shared: &[Parameter],
        skip_segments: &[String],
    ) -> Result<Self> {
        let empty = IndexMap::new();
        let map = match definition {
            DocValue::Map(map) => map,
            DocValue::Null => &empty,
            other => {
                return Err(SpecError::InvalidFragment(format!(
                    "operation {} {} must be a map, found {}",
                    method,
                    path,
                    other.kind()
                )))
            },
        };

        let own = match map.get("parameters") {
            Some(list) => parameters_of(root, list)?,
            None => Vec::new(),
        };

        let request_body = match map.get("requestBody") {
            Some(body) => Some(RequestBody::from_value(root, body)?),
            None => None,
        };

        Ok(Operation {
            method: method.to_lowercase(),
            path: path.to_string(),
            operation_id: text_of(map.get("operationId"))
                .unwrap_or_else(|| derive_operation_id(method, path, skip_segments)),
            summary: text_of(map.get("summary")),
            description: text_of(map.get("description")),
            tags: map.get("tags").map(names_of).unwrap_or_default(),
            parameters: merge_parameters(shared, own),
            request_body,
        })
    }

    /// Description, falling back to the summary
    pub fn about(&self) -> Option<&str> {
        self.description.as_deref().or(self.summary.as_deref())
    }

    pub fn headers(&self) -> Vec<&Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == Some(ParameterLocation::Header))
            .collect()
    }

    pub fn required_parameters(&self) -> Vec<&Parameter> {
        self.parameters.iter().filter(|p| p.required).collect()
    }

    pub fn has_path_params(&self) -> bool {
        self.parameters
            .iter()
            .any(|p| p.location == Some(ParameterLocation::Path))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} {} operation: {}>",
            self.method.to_uppercase(),
            self.path,
            self.operation_id
        )
    }
}

/// Name an operation that has no `operationId`
///
/// The method is followed by the path segments joined with `_`. Template
/// segments (`{id}`) and segments listed in `skip` are left out, so
/// `get /v3/pets/{id}/toys` becomes `get_pets_toys`.
pub fn derive_operation_id(method: &str, path: &str, skip: &[String]) -> String {
    let mut id = method.to_lowercase();
    for segment in path.split('/') {
        if segment.is_empty() || segment.contains('{') || skip.iter().any(|s| s == segment) {
            continue;
        }
        id.push('_');
        id.push_str(segment);
    }
    id
}

pub(crate) fn parameters_of(root: &DocValue, list: &DocValue) -> Result<Vec<Parameter>> {
    match list {
        DocValue::List(items) => items
            .iter()
            .map(|item| Parameter::from_value(root, item))
            .collect(),
        DocValue::Null => Ok(Vec::new()),
        single => Ok(vec![Parameter::from_value(root, single)?]),
    }
}

/// Path-level parameters, replaced by operation parameters with the same
/// name and location
fn merge_parameters(shared: &[Parameter], own: Vec<Parameter>) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = shared
        .iter()
        .filter(|p| !own.iter().any(|o| o.key() == p.key()))
        .cloned()
        .collect();
    merged.extend(own);
    merged
}

fn follow_reference<'a>(root: &'a DocValue, value: &'a DocValue) -> Result<&'a DocValue> {
    match value.get("$ref").and_then(DocValue::as_str) {
        Some(pointer) => resolve_pointer(root, pointer),
        None => Ok(value),
    }
}

pub(crate) fn text_of(value: Option<&DocValue>) -> Option<String> {
    value
        .and_then(DocValue::scalar_text)
        .filter(|text| !text.is_empty())
        .map(Cow::into_owned)
}

/// Names from a `tags` value: plain strings or maps with a `name`
pub(crate) fn names_of(value: &DocValue) -> Vec<String> {
    let name = |item: &DocValue| match item {
        DocValue::Map(map) => text_of(map.get("name")),
        other => text_of(Some(other)),
    };

    match value {
        DocValue::List(items) => items.iter().filter_map(name).collect(),
        other => name(other).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derive_operation_id() {
        let skip = vec!["v3".to_string(), "sd".to_string(), "sp".to_string()];
        assert_eq!(derive_operation_id("get", "/pets", &skip), "get_pets");
        assert_eq!(
            derive_operation_id("POST", "/v3/sd/pets/{petId}/toys", &skip),
            "post_pets_toys"
        );
        assert_eq!(derive_operation_id("get", "/", &skip), "get");
        assert_eq!(derive_operation_id("get", "/v3/pets", &[]), "get_v3_pets");
    }

    #[test]
    fn test_parameter_required_coercion() {
        let root = DocValue::Null;
        let value = DocValue::from(json!({
            "name": "petId",
            "in": "path",
            "required": "true",
            "style": "simple",
            "schema": {"type": "integer"}
        }));
        let parameter = Parameter::from_value(&root, &value).unwrap();

        assert!(parameter.required);
        assert_eq!(parameter.location, Some(ParameterLocation::Path));
        assert_eq!(parameter.extra["style"], DocValue::string("simple"));
        assert_eq!(parameter.schema.as_ref().unwrap().name, "petId");
        assert_eq!(parameter.to_string(), "<path parameter: petId>");

        let value = DocValue::from(json!({"name": "q", "in": "query", "required": "false"}));
        assert!(!Parameter::from_value(&root, &value).unwrap().required);
    }

    #[test]
    fn test_parameter_reference() {
        let root = DocValue::from(json!({"components": {"parameters": {
            "Limit": {"name": "limit", "in": "query"}
        }}}));
        let value = DocValue::from(json!({"$ref": "#/components/parameters/Limit"}));
        let parameter = Parameter::from_value(&root, &value).unwrap();
        assert_eq!(parameter.name, "limit");
        assert_eq!(parameter.location, Some(ParameterLocation::Query));
    }

    #[test]
    fn test_request_body_template() {
        let root = DocValue::Null;
        let value = DocValue::from(json!({
            "required": "true",
            "content": {
                "application/json": {"schema": {"properties": {"name": {"type": "string"}}}},
                "application/xml": {"schema": {"type": "string"}}
            }
        }));
        let body = RequestBody::from_value(&root, &value).unwrap();

        assert!(body.required);
        assert_eq!(body.content_type.as_deref(), Some("application/json"));
        assert_eq!(body.template().unwrap(), json!({"name": "placeholder"}));
    }

    #[test]
    fn test_request_body_without_content() {
        let body = RequestBody::from_value(&DocValue::Null, &DocValue::from(json!({}))).unwrap();
        assert_eq!(body.content_type, None);
        assert_eq!(body.template().unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_operation_level_parameter_overrides_path_level() {
        let root = DocValue::Null;
        let shared = parameters_of(
            &root,
            &DocValue::from(json!([
                {"name": "petId", "in": "path", "required": true},
                {"name": "trace", "in": "header"}
            ])),
        )
        .unwrap();
        let definition = DocValue::from(json!({
            "parameters": [{"name": "petId", "in": "path", "required": true, "description": "own"}]
        }));

        let operation =
            Operation::from_value(&root, "/pets/{petId}", "get", &definition, &shared, &[]).unwrap();
        assert_eq!(operation.parameters.len(), 2);
        assert_eq!(operation.parameters[0].name, "trace");
        assert_eq!(operation.parameters[1].description.as_deref(), Some("own"));
        assert_eq!(operation.headers().len(), 1);
        assert!(operation.has_path_params());
        assert_eq!(operation.operation_id, "get_pets");
    }

    #[test]
    fn test_about_prefers_description() {
        let root = DocValue::Null;
        let definition = DocValue::from(json!({"summary": "List", "description": "List all pets"}));
        let operation = Operation::from_value(&root, "/pets", "get", &definition, &[], &[]).unwrap();
        assert_eq!(operation.about(), Some("List all pets"));

        let definition = DocValue::from(json!({"summary": "List"}));
        let operation = Operation::from_value(&root, "/pets", "get", &definition, &[], &[]).unwrap();
        assert_eq!(operation.about(), Some("List"));
    }

    #[test]
    fn test_names_of_accepts_both_forms() {
        assert_eq!(
            names_of(&DocValue::from(json!([{"name": "pets"}, "store"]))),
            vec!["pets", "store"]
        );
        assert_eq!(names_of(&DocValue::from(json!("pets"))), vec!["pets"]);
    }
}
