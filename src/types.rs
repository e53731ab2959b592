//! Core types shared by the registrar, composer and registry.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DeclareError;

/// Constraint key that controls required-ness instead of being emitted.
pub const REQUIRED_DIRECTIVE: &str = "required";

/// Keys owned by the node builder; constraints never override them.
pub const STRUCTURAL_KEYWORDS: &[&str] = &["type", "items"];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Identity of a model class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ClassName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ClassName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&ClassName> for ClassName {
    fn from(name: &ClassName) -> Self {
        name.clone()
    }
}

/// JSON primitive a field can be described as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Number,
    String,
    Boolean,
}

impl PrimitiveKind {
    /// Returns the JSON Schema `type` keyword value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Number => "number",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
        }
    }

    /// Parse a primitive name. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "number" => Some(PrimitiveKind::Number),
            "string" => Some(PrimitiveKind::String),
            "boolean" => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }
}

/// Declared type of a field as reported by a [`TypeResolver`](crate::TypeResolver).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// A sequence whose element type is not known to the resolver.
    Array,
    /// Another model class.
    Class(ClassName),
    /// Unions, interfaces, maps and free-form values.
    Opaque,
}

impl TypeDescriptor {
    pub fn class(name: impl Into<ClassName>) -> Self {
        TypeDescriptor::Class(name.into())
    }

    /// Parse a declared type name as written in a manifest.
    ///
    /// `array` and `object` are the container kinds; primitive names map to
    /// primitives; anything else names a class.
    pub fn parse(s: &str) -> Self {
        match s {
            "array" => TypeDescriptor::Array,
            "object" => TypeDescriptor::Opaque,
            other => match PrimitiveKind::parse(other) {
                Some(kind) => TypeDescriptor::Primitive(kind),
                None => TypeDescriptor::Class(ClassName::from(other)),
            },
        }
    }
}

/// Explicit type hint supplied by the caller.
///
/// Required for array fields (it names the item type) and for fields whose
/// declared type is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Primitive(PrimitiveKind),
    Class(ClassName),
}

impl FieldType {
    pub fn number() -> Self {
        FieldType::Primitive(PrimitiveKind::Number)
    }

    pub fn string() -> Self {
        FieldType::Primitive(PrimitiveKind::String)
    }

    pub fn boolean() -> Self {
        FieldType::Primitive(PrimitiveKind::Boolean)
    }

    pub fn class(name: impl Into<ClassName>) -> Self {
        FieldType::Class(name.into())
    }

    /// Parse a primitive name, falling back to a class name.
    pub fn parse(s: &str) -> Self {
        match PrimitiveKind::parse(s) {
            Some(kind) => FieldType::Primitive(kind),
            None => FieldType::Class(ClassName::from(s)),
        }
    }
}

/// Per-field JSON Schema keywords plus the `required` directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraints(Map<String, Value>);

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyword, e.g. `minLength` or `maximum`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set the `required` directive.
    pub fn required(self, required: bool) -> Self {
        self.with(REQUIRED_DIRECTIVE, required)
    }

    /// A field is required unless the directive is literally `false`.
    pub fn is_required(&self) -> bool {
        !matches!(self.0.get(REQUIRED_DIRECTIVE), Some(Value::Bool(false)))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Schema keywords to emit, in insertion order, without the directive.
    pub fn keywords(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(k, _)| k.as_str() != REQUIRED_DIRECTIVE)
    }
}

impl From<Map<String, Value>> for Constraints {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Constraints {
    type Error = DeclareError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DeclareError::InvalidConstraints {
                actual: json_type_name(&other).to_string(),
            }),
        }
    }
}

/// Class-level metadata copied into the finalized schema when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaMetadata {
    /// Identifier; when set the schema is registered under it.
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Dialect URI, e.g. `http://json-schema.org/draft-04/schema#`.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
