//! Finalized class schemas.
//!
//! A [`FinalSchema`] is produced once per finalization and never mutated
//! afterwards. Its JSON form keeps a fixed key order:
//!
//! ```json
//! {
//!   "$id": "...", "$schema": "...", "title": "...", "description": "...",
//!   "type": "object",
//!   "required": ["..."],
//!   "properties": { "...": {} }
//! }
//! ```
//!
//! Metadata keys are only emitted when present.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::property::{ClassAccumulator, PropertyNode};
use crate::types::SchemaMetadata;

/// Complete, immutable schema of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalSchema {
    metadata: SchemaMetadata,
    required: Vec<String>,
    properties: IndexMap<String, PropertyNode>,
}

impl FinalSchema {
    pub fn id(&self) -> Option<&str> {
        self.metadata.id.as_deref()
    }

    pub fn dialect(&self) -> Option<&str> {
        self.metadata.schema.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.description.as_deref()
    }

    pub fn metadata(&self) -> &SchemaMetadata {
        &self.metadata
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyNode> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyNode> {
        self.properties.get(name)
    }

    /// Copy of this schema's fields as a fresh accumulator, for subclasses.
    pub fn to_accumulator(&self) -> ClassAccumulator {
        ClassAccumulator::from_parts(self.properties.clone(), self.required.clone())
    }

    pub fn to_value(&self) -> Value {
        // Property nodes only hold strings and JSON values
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for FinalSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = &self.metadata.id {
            map.serialize_entry("$id", id)?;
        }
        if let Some(schema) = &self.metadata.schema {
            map.serialize_entry("$schema", schema)?;
        }
        if let Some(title) = &self.metadata.title {
            map.serialize_entry("title", title)?;
        }
        if let Some(description) = &self.metadata.description {
            map.serialize_entry("description", description)?;
        }
        map.serialize_entry("type", "object")?;
        map.serialize_entry("required", &self.required)?;
        map.serialize_entry("properties", &self.properties)?;
        map.end()
    }
}

/// Build the final schema of a class.
///
/// With a parent, the parent's fields come first in the parent's order and
/// the class's own fields follow; a redeclared field replaces the parent's
/// node in place.
pub fn compose_schema(
    parent: Option<&FinalSchema>,
    own: &ClassAccumulator,
    metadata: SchemaMetadata,
) -> FinalSchema {
    let merged = match parent {
        Some(parent) => {
            let mut acc = parent.to_accumulator();
            acc.extend(own);
            acc
        }
        None => own.clone(),
    };
    let (properties, required) = merged.into_parts();

    FinalSchema {
        metadata,
        required,
        properties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Constraints, PrimitiveKind};
    use serde_json::json;

    fn node(kind: PrimitiveKind) -> PropertyNode {
        PropertyNode::primitive(kind, Constraints::new())
    }

    #[test]
    fn single_string_field() {
        let mut acc = ClassAccumulator::new();
        acc.insert("a", node(PrimitiveKind::String), true);

        let schema = compose_schema(None, &acc, SchemaMetadata::new());
        assert_eq!(
            schema.to_value(),
            json!({
                "type": "object",
                "required": ["a"],
                "properties": { "a": { "type": "string" } }
            })
        );
    }

    #[test]
    fn empty_class() {
        let schema = compose_schema(None, &ClassAccumulator::new(), SchemaMetadata::new());
        assert_eq!(
            schema.to_value(),
            json!({ "type": "object", "required": [], "properties": {} })
        );
    }

    #[test]
    fn metadata_keys_come_first_and_only_when_present() {
        let schema = compose_schema(
            None,
            &ClassAccumulator::new(),
            SchemaMetadata::new().id("A#ref").title("A"),
        );
        let value = schema.to_value();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["$id", "title", "type", "required", "properties"]);
        assert!(value.get("$schema").is_none());
        assert!(value.get("description").is_none());
        assert_eq!(schema.id(), Some("A#ref"));
    }

    #[test]
    fn all_metadata_keys() {
        let schema = compose_schema(
            None,
            &ClassAccumulator::new(),
            SchemaMetadata::new()
                .id("urn:owner")
                .schema("http://json-schema.org/draft-04/schema#")
                .title("Owner")
                .description("An owner"),
        );
        let value = schema.to_value();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["$id", "$schema", "title", "description", "type", "required", "properties"]
        );
        assert_eq!(schema.dialect(), Some("http://json-schema.org/draft-04/schema#"));
        assert_eq!(schema.description(), Some("An owner"));
    }

    #[test]
    fn parent_fields_come_first() {
        let mut parent_acc = ClassAccumulator::new();
        parent_acc.insert("a", node(PrimitiveKind::String), true);
        let parent = compose_schema(None, &parent_acc, SchemaMetadata::new().id("A#ref"));

        let mut own = ClassAccumulator::new();
        own.insert("b", node(PrimitiveKind::Number), true);

        let schema = compose_schema(Some(&parent), &own, SchemaMetadata::new());
        assert_eq!(schema.required(), ["a", "b"]);
        let names: Vec<&String> = schema.properties().keys().collect();
        assert_eq!(names, vec!["a", "b"]);
        // Parent metadata is not inherited
        assert_eq!(schema.id(), None);
    }

    #[test]
    fn redeclared_parent_field_replaced_in_place() {
        let mut parent_acc = ClassAccumulator::new();
        parent_acc.insert("a", node(PrimitiveKind::String), true);
        parent_acc.insert("b", node(PrimitiveKind::String), true);
        let parent = compose_schema(None, &parent_acc, SchemaMetadata::new());

        let mut own = ClassAccumulator::new();
        own.insert("a", node(PrimitiveKind::Number), false);
        own.insert("c", node(PrimitiveKind::Boolean), true);

        let schema = compose_schema(Some(&parent), &own, SchemaMetadata::new());
        let names: Vec<&String> = schema.properties().keys().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(schema.required(), ["b", "c"]);
        assert_eq!(schema.property("a"), Some(&node(PrimitiveKind::Number)));
    }

    #[test]
    fn parent_schema_untouched() {
        let mut parent_acc = ClassAccumulator::new();
        parent_acc.insert("a", node(PrimitiveKind::String), true);
        let parent = compose_schema(None, &parent_acc, SchemaMetadata::new());
        let before = parent.clone();

        let mut own = ClassAccumulator::new();
        own.insert("b", node(PrimitiveKind::String), true);
        let _ = compose_schema(Some(&parent), &own, SchemaMetadata::new());

        assert_eq!(parent, before);
    }
}
