//! Field declarations and the schema fragments they turn into.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::compose::FinalSchema;
use crate::types::{Constraints, FieldType, PrimitiveKind, STRUCTURAL_KEYWORDS};

/// Schema fragment for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyNode {
    Primitive {
        kind: PrimitiveKind,
        constraints: Constraints,
    },
    Array {
        items: Box<PropertyNode>,
        array_constraints: Constraints,
    },
    /// `{"$ref": id}` to a class finalized with an `$id`.
    Reference { id: String },
    /// Inline copy of a class finalized without an `$id`.
    Embedded(Box<FinalSchema>),
}

impl PropertyNode {
    pub fn primitive(kind: PrimitiveKind, constraints: Constraints) -> Self {
        PropertyNode::Primitive { kind, constraints }
    }

    pub fn array(items: PropertyNode, array_constraints: Constraints) -> Self {
        PropertyNode::Array {
            items: Box::new(items),
            array_constraints,
        }
    }

    /// Node for a class-typed field given that class's finalized schema.
    pub fn for_schema(schema: &FinalSchema) -> Self {
        match schema.id() {
            Some(id) => PropertyNode::Reference { id: id.to_string() },
            None => PropertyNode::Embedded(Box::new(schema.clone())),
        }
    }

    pub fn to_value(&self) -> Value {
        // Serializing a map of strings to JSON values cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn serialize_keywords<M: SerializeMap>(
    map: &mut M,
    constraints: &Constraints,
) -> Result<(), M::Error> {
    for (key, value) in constraints.keywords() {
        if STRUCTURAL_KEYWORDS.contains(&key.as_str()) {
            continue;
        }
        map.serialize_entry(key, value)?;
    }
    Ok(())
}

impl Serialize for PropertyNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyNode::Primitive { kind, constraints } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", kind.as_str())?;
                serialize_keywords(&mut map, constraints)?;
                map.end()
            }
            PropertyNode::Array {
                items,
                array_constraints,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
                serialize_keywords(&mut map, array_constraints)?;
                map.end()
            }
            PropertyNode::Reference { id } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$ref", id)?;
                map.end()
            }
            PropertyNode::Embedded(schema) => schema.serialize(serializer),
        }
    }
}

/// One field declaration handed to the registrar.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldDecl {
    pub name: String,
    /// Item type for arrays, or an override of the resolved type.
    pub explicit_type: Option<FieldType>,
    pub constraints: Option<Constraints>,
    pub array_constraints: Option<Constraints>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn of(mut self, explicit_type: FieldType) -> Self {
        self.explicit_type = Some(explicit_type);
        self
    }

    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn array_constraints(mut self, array_constraints: Constraints) -> Self {
        self.array_constraints = Some(array_constraints);
        self
    }

    /// Shorthand for `required: false`, keeping any other constraints.
    pub fn optional(mut self) -> Self {
        let constraints = self.constraints.take().unwrap_or_default();
        self.constraints = Some(constraints.required(false));
        self
    }

    pub fn is_required(&self) -> bool {
        self.constraints
            .as_ref()
            .map(Constraints::is_required)
            .unwrap_or(true)
    }
}

/// Per-class state collected before finalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassAccumulator {
    properties: IndexMap<String, PropertyNode>,
    required: Vec<String>,
}

impl ClassAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an accumulator from already finalized properties.
    pub fn from_parts(properties: IndexMap<String, PropertyNode>, required: Vec<String>) -> Self {
        Self {
            properties,
            required,
        }
    }

    /// Add or replace a field.
    ///
    /// A replaced field keeps its position; its required-ness is recomputed.
    pub fn insert(&mut self, name: impl Into<String>, node: PropertyNode, required: bool) {
        let name = name.into();
        let listed = self.required.iter().position(|r| *r == name);
        match (required, listed) {
            (true, None) => self.required.push(name.clone()),
            (false, Some(idx)) => {
                self.required.remove(idx);
            }
            _ => {}
        }
        self.properties.insert(name, node);
    }

    /// Append every field of `other` after this accumulator's own.
    ///
    /// Fields already present are replaced in place and take `other`'s
    /// required-ness; `other`'s required names follow this one's.
    pub fn extend(&mut self, other: &ClassAccumulator) {
        for (name, node) in &other.properties {
            self.properties.insert(name.clone(), node.clone());
        }
        self.required
            .retain(|name| !other.properties.contains_key(name) || other.is_required(name));
        for name in &other.required {
            if !self.is_required(name) {
                self.required.push(name.clone());
            }
        }
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyNode> {
        &self.properties
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub(crate) fn into_parts(self) -> (IndexMap<String, PropertyNode>, Vec<String>) {
        (self.properties, self.required)
    }
}
