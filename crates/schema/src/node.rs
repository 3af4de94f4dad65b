//! Schema node graph

use indexmap::IndexMap;
use looseapi_common::DocValue;
use std::borrow::Cow;
use std::fmt;

/// Declared type of a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Float,
    Boolean,
    /// Any other tag; synthesis rejects it
    Unknown(String),
}

impl SchemaType {
    /// Map a `type` tag to a schema type
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "object" => SchemaType::Object,
            "array" => SchemaType::Array,
            "string" => SchemaType::String,
            "integer" => SchemaType::Integer,
            "number" => SchemaType::Number,
            "float" => SchemaType::Float,
            "boolean" => SchemaType::Boolean,
            other => SchemaType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Float => "float",
            SchemaType::Boolean => "boolean",
            SchemaType::Unknown(tag) => tag,
        }
    }

    /// Object and array schemas are containers; everything else is a leaf
    pub fn is_container(&self) -> bool {
        matches!(self, SchemaType::Object | SchemaType::Array)
    }
}

/// The `required` keyword: a flag on parameters and bodies, a list of
/// property names on object schemas
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Required {
    Flag(bool),
    Properties(Vec<String>),
}

/// One resolved schema fragment
///
/// References are copied in when the graph is built, so a node owns its
/// whole subtree and the graph never shares or cycles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaNode {
    /// Key this node was built under (property name, `items`, component name)
    pub name: String,

    /// `type`; `None` means object
    pub schema_type: Option<SchemaType>,

    /// `properties`, in declaration order
    pub properties: Option<IndexMap<String, SchemaNode>>,

    /// `items`
    pub items: Option<Box<SchemaNode>>,

    /// `enum`
    pub enum_values: Option<Vec<DocValue>>,

    /// `default`
    pub default: Option<DocValue>,

    /// `minimum`
    pub minimum: Option<DocValue>,

    /// `description`
    pub description: Option<String>,

    /// `required`
    pub required: Option<Required>,

    /// Other map-valued keywords, built as schema nodes
    pub nested: IndexMap<String, SchemaNode>,

    /// Other keywords, kept verbatim
    pub extra: IndexMap<String, DocValue>,

    /// Set when this node stands for a reference back into one of its own
    /// ancestors; the reference is not expanded a second time
    pub recursive_ref: Option<String>,
}

/// Result of a named attribute lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute<'a> {
    Node(&'a SchemaNode),
    Properties(&'a IndexMap<String, SchemaNode>),
    Value(Cow<'a, DocValue>),
}

impl<'a> Attribute<'a> {
    pub fn as_node(&self) -> Option<&'a SchemaNode> {
        match self {
            Attribute::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&DocValue> {
        match self {
            Attribute::Value(value) => Some(value.as_ref()),
            _ => None,
        }
    }
}

impl SchemaNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Leaf standing for a recursive reference
    pub fn recursive(name: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recursive_ref: Some(pointer.into()),
            ..Self::default()
        }
    }

    /// Declared type, defaulting to object
    pub fn effective_type(&self) -> Cow<'_, SchemaType> {
        match &self.schema_type {
            Some(schema_type) => Cow::Borrowed(schema_type),
            None => Cow::Owned(SchemaType::Object),
        }
    }

    /// Property by name
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties.as_ref().and_then(|props| props.get(name))
    }

    /// Look up a keyword by name.
    ///
    /// The node's own attributes are checked first, then `items`, then a
    /// property with that name.
    pub fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        if let Some(own) = self.own_attribute(name) {
            return Some(own);
        }

        match (&self.items, &self.properties) {
            (Some(items), _) => items.attribute(name),
            (None, Some(properties)) => properties.get(name).map(Attribute::Node),
            (None, None) => None,
        }
    }

    fn own_attribute(&self, name: &str) -> Option<Attribute<'_>> {
        let owned = |value: DocValue| Some(Attribute::Value(Cow::Owned(value)));

        match name {
            "type" => self
                .schema_type
                .as_ref()
                .and_then(|t| owned(DocValue::string(t.as_str()))),
            "properties" => self.properties.as_ref().map(Attribute::Properties),
            "items" => self.items.as_deref().map(Attribute::Node),
            "enum" => self
                .enum_values
                .as_ref()
                .and_then(|values| owned(DocValue::List(values.clone()))),
            "default" => self
                .default
                .as_ref()
                .map(|v| Attribute::Value(Cow::Borrowed(v))),
            "minimum" => self
                .minimum
                .as_ref()
                .map(|v| Attribute::Value(Cow::Borrowed(v))),
            "description" => self
                .description
                .as_ref()
                .and_then(|d| owned(DocValue::string(d.as_str()))),
            "required" => match &self.required {
                Some(Required::Flag(flag)) => owned(DocValue::Bool(*flag)),
                Some(Required::Properties(names)) => owned(DocValue::List(
                    names.iter().map(|n| DocValue::string(n.as_str())).collect(),
                )),
                None => None,
            },
            _ => self
                .nested
                .get(name)
                .map(Attribute::Node)
                .or_else(|| {
                    self.extra
                        .get(name)
                        .map(|v| Attribute::Value(Cow::Borrowed(v)))
                }),
        }
    }

    /// Merge another fragment into this node, keeping what is already here.
    ///
    /// Lists are unioned, nested nodes merge recursively, and for scalar
    /// conflicts the first definition wins.
    pub fn merge_from(&mut self, other: SchemaNode) {
        if self.schema_type.is_none() {
            self.schema_type = other.schema_type;
        }

        if let Some(theirs) = other.properties {
            match &mut self.properties {
                Some(mine) => merge_node_maps(mine, theirs),
                None => self.properties = Some(theirs),
            }
        }

        if let Some(theirs) = other.items {
            match &mut self.items {
                Some(mine) => mine.merge_from(*theirs),
                None => self.items = Some(theirs),
            }
        }

        if let Some(theirs) = other.enum_values {
            match &mut self.enum_values {
                Some(mine) => union_into(mine, theirs),
                None => self.enum_values = Some(theirs),
            }
        }

        if let Some(theirs) = other.required {
            if self.required.is_none() {
                self.required = Some(theirs);
            } else if let (Some(Required::Properties(mine)), Required::Properties(theirs)) =
                (&mut self.required, theirs)
            {
                union_into(mine, theirs);
            }
        }

        self.default = self.default.take().or(other.default);
        self.minimum = self.minimum.take().or(other.minimum);
        self.description = self.description.take().or(other.description);
        self.recursive_ref = self.recursive_ref.take().or(other.recursive_ref);

        merge_node_maps(&mut self.nested, other.nested);

        for (key, value) in other.extra {
            if !self.extra.contains_key(&key) {
                self.extra.insert(key, value);
            } else if let (Some(DocValue::List(mine)), DocValue::List(theirs)) =
                (self.extra.get_mut(&key), value)
            {
                union_into(mine, theirs);
            }
        }
    }
}

fn merge_node_maps(mine: &mut IndexMap<String, SchemaNode>, theirs: IndexMap<String, SchemaNode>) {
    for (key, node) in theirs {
        match mine.get_mut(&key) {
            Some(existing) => existing.merge_from(node),
            None => {
                mine.insert(key, node);
            },
        }
    }
}

fn union_into<T: PartialEq>(mine: &mut Vec<T>, theirs: Vec<T>) {
    for item in theirs {
        if !mine.contains(&item) {
            mine.push(item);
        }
    }
}

impl fmt::Display for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "<{}: {}>", self.name, description),
            None => write!(f, "<{}>", self.name),
        }
    }
}
