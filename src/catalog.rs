//! Schema catalog: the registrar, composer and registry working together.
//!
//! Declaring a class is two-phase: [`SchemaCatalog::register_field`] once
//! per field, then [`SchemaCatalog::finalize`] once for the class. A class
//! used as another class's field type, or as a parent, must be finalized
//! first.
//!
//! The catalog has no internal locking. Callers that declare schemas from
//! several threads share it behind a `Mutex`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::compose::{compose_schema, FinalSchema};
use crate::error::DeclareError;
use crate::property::{ClassAccumulator, FieldDecl, PropertyNode};
use crate::registry::SchemaRegistry;
use crate::resolver::{DeclaredTypes, TypeResolver};
use crate::types::{ClassName, Constraints, FieldType, SchemaMetadata, TypeDescriptor};

/// Owns the per-class accumulators, finalized schemas and id registry.
#[derive(Debug)]
pub struct SchemaCatalog<R = DeclaredTypes> {
    resolver: R,
    accumulators: HashMap<ClassName, ClassAccumulator>,
    parents: HashMap<ClassName, ClassName>,
    schemas: HashMap<ClassName, Arc<FinalSchema>>,
    registry: SchemaRegistry,
}

impl<R: Default> Default for SchemaCatalog<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R> SchemaCatalog<R> {
    /// Create a catalog with an empty registry.
    pub fn new(resolver: R) -> Self {
        Self::with_registry(resolver, SchemaRegistry::new())
    }

    /// Create a catalog around an existing registry.
    pub fn with_registry(resolver: R, registry: SchemaRegistry) -> Self {
        Self {
            resolver,
            accumulators: HashMap::new(),
            parents: HashMap::new(),
            schemas: HashMap::new(),
            registry,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Declare `class` as a subclass of `parent`.
    ///
    /// The parent's finalized fields are prepended when `class` is finalized.
    pub fn extends(&mut self, class: impl Into<ClassName>, parent: impl Into<ClassName>) {
        let class = class.into();
        let parent = parent.into();
        tracing::debug!(%class, %parent, "declared parent");
        self.parents.insert(class, parent);
    }

    pub fn parent(&self, class: &str) -> Option<&ClassName> {
        self.parents.get(class)
    }

    /// Fields declared so far on `class` itself (not its parent's).
    pub fn accumulator(&self, class: &str) -> Option<&ClassAccumulator> {
        self.accumulators.get(class)
    }

    /// Latest finalized schema of `class`.
    pub fn schema(&self, class: &str) -> Option<Arc<FinalSchema>> {
        self.schemas.get(class).cloned()
    }

    pub fn is_finalized(&self, class: &str) -> bool {
        self.schemas.contains_key(class)
    }

    /// Class bound to `id`.
    ///
    /// # Errors
    ///
    /// Returns `DeclareError::Registry` with `SchemaNotFound` if `id` is unbound.
    pub fn get_by_id(&self, id: &str) -> Result<&ClassName, DeclareError> {
        Ok(self.registry.get_by_id(id)?)
    }

    /// Schema of the class bound to `id`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaNotFound` if `id` is unbound.
    pub fn schema_by_id(&self, id: &str) -> Result<Arc<FinalSchema>, DeclareError> {
        let class = self.registry.get_by_id(id)?;
        self.schema(class.as_str())
            .ok_or_else(|| DeclareError::NotFinalized {
                class: class.to_string(),
            })
    }

    /// Forget every accumulator, parent link, schema and id binding.
    pub fn reset(&mut self) {
        self.accumulators.clear();
        self.parents.clear();
        self.schemas.clear();
        self.registry.clear();
    }

    /// Finalize `class` into an immutable schema.
    ///
    /// Registers the schema under `metadata.id` when present. On error
    /// nothing changes: a previously finalized schema stays in place.
    ///
    /// # Errors
    ///
    /// Returns `ParentNotFinalized` if the class extends a class without a
    /// schema, or `DuplicateSchemaId` if the id belongs to another class.
    pub fn finalize(
        &mut self,
        class: impl Into<ClassName>,
        metadata: Option<SchemaMetadata>,
    ) -> Result<Arc<FinalSchema>, DeclareError> {
        let class = class.into();
        let metadata = metadata.unwrap_or_default();

        let parent = match self.parents.get(&class) {
            Some(parent) => Some(self.schemas.get(parent).cloned().ok_or_else(|| {
                DeclareError::ParentNotFinalized {
                    class: class.to_string(),
                    parent: parent.to_string(),
                }
            })?),
            None => None,
        };

        let empty = ClassAccumulator::new();
        let own = self.accumulators.get(&class).unwrap_or(&empty);
        let schema = Arc::new(compose_schema(parent.as_deref(), own, metadata));

        if let Some(id) = schema.id() {
            self.registry.register(id, class.clone())?;
        }

        tracing::debug!(
            %class,
            id = schema.id().unwrap_or(""),
            fields = schema.properties().len(),
            "finalized schema"
        );
        self.schemas.insert(class, Arc::clone(&schema));
        Ok(schema)
    }

    /// Schema of `class` as JSON with every `$ref` replaced by the
    /// referenced class's schema.
    ///
    /// # Errors
    ///
    /// Returns `NotFinalized` if `class` has no schema, or `SchemaNotFound`
    /// if a reference points at an unbound id.
    pub fn bundle(&self, class: &str) -> Result<Value, DeclareError> {
        let schema = self
            .schema(class)
            .ok_or_else(|| DeclareError::NotFinalized {
                class: class.to_string(),
            })?;
        let mut visiting = HashSet::new();
        visiting.insert(ClassName::from(class));
        self.bundle_schema(&schema, &mut visiting)
    }

    /// JSON of `schema` with the references among its property nodes
    /// inlined. Constraint values are emitted as declared.
    fn bundle_schema(
        &self,
        schema: &FinalSchema,
        visiting: &mut HashSet<ClassName>,
    ) -> Result<Value, DeclareError> {
        let mut properties = Map::new();
        for (name, node) in schema.properties() {
            properties.insert(name.clone(), self.bundle_node(node, visiting)?);
        }

        let mut value = schema.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert("properties".to_string(), Value::Object(properties));
        }
        Ok(value)
    }

    fn bundle_node(
        &self,
        node: &PropertyNode,
        visiting: &mut HashSet<ClassName>,
    ) -> Result<Value, DeclareError> {
        match node {
            PropertyNode::Primitive { .. } => Ok(node.to_value()),
            PropertyNode::Array { items, .. } => {
                let mut value = node.to_value();
                if let Value::Object(obj) = &mut value {
                    obj.insert("items".to_string(), self.bundle_node(items, visiting)?);
                }
                Ok(value)
            }
            PropertyNode::Embedded(schema) => self.bundle_schema(schema, visiting),
            PropertyNode::Reference { id } => {
                let class = self.registry.get_by_id(id)?.clone();
                // A class already on the path stays a $ref
                if visiting.contains(&class) {
                    return Ok(node.to_value());
                }
                let target = self
                    .schema(class.as_str())
                    .ok_or_else(|| DeclareError::NotFinalized {
                        class: class.to_string(),
                    })?;
                tracing::trace!(%id, %class, "inlining reference");

                visiting.insert(class.clone());
                let inlined = self.bundle_schema(&target, visiting);
                visiting.remove(&class);
                inlined
            }
        }
    }
}

impl<R: TypeResolver> SchemaCatalog<R> {
    /// Convert one field declaration into a schema fragment and record it on
    /// `class`, creating the class's accumulator if needed.
    ///
    /// # Errors
    ///
    /// - `MissingTypeInfo` if the resolver knows nothing about the field
    /// - `MissingArrayItemType` if an array field has no explicit item type
    /// - `InvalidPropertyType` if the field is opaque and has no explicit type
    /// - `UndeclaredReferencedSchema` if the field's class is not finalized
    ///
    /// On error the accumulator is left untouched.
    pub fn register_field(
        &mut self,
        class: impl Into<ClassName>,
        field: FieldDecl,
    ) -> Result<(), DeclareError> {
        let class = class.into();
        let descriptor = self.resolver.resolve(class.as_str(), &field.name)?;
        let constraints = field.constraints.clone().unwrap_or_default();

        let node = match descriptor {
            TypeDescriptor::Array => {
                let item_type =
                    field
                        .explicit_type
                        .as_ref()
                        .ok_or_else(|| DeclareError::MissingArrayItemType {
                            class: class.to_string(),
                            field: field.name.clone(),
                        })?;
                let items = self.build_node(&class, &field.name, item_type, constraints)?;
                PropertyNode::array(items, field.array_constraints.clone().unwrap_or_default())
            }
            TypeDescriptor::Opaque => {
                let hint =
                    field
                        .explicit_type
                        .as_ref()
                        .ok_or_else(|| DeclareError::InvalidPropertyType {
                            class: class.to_string(),
                            field: field.name.clone(),
                        })?;
                self.build_node(&class, &field.name, hint, constraints)?
            }
            TypeDescriptor::Primitive(kind) => {
                let field_type = field
                    .explicit_type
                    .clone()
                    .unwrap_or(FieldType::Primitive(kind));
                self.build_node(&class, &field.name, &field_type, constraints)?
            }
            TypeDescriptor::Class(referenced) => {
                let field_type = field
                    .explicit_type
                    .clone()
                    .unwrap_or(FieldType::Class(referenced));
                self.build_node(&class, &field.name, &field_type, constraints)?
            }
        };

        let required = field.is_required();
        tracing::debug!(%class, field = %field.name, required, "registered field");
        self.accumulators
            .entry(class)
            .or_default()
            .insert(field.name, node, required);
        Ok(())
    }

    fn build_node(
        &self,
        class: &ClassName,
        field: &str,
        field_type: &FieldType,
        constraints: Constraints,
    ) -> Result<PropertyNode, DeclareError> {
        match field_type {
            FieldType::Primitive(kind) => Ok(PropertyNode::primitive(*kind, constraints)),
            FieldType::Class(referenced) => {
                let schema = self.schemas.get(referenced).ok_or_else(|| {
                    DeclareError::UndeclaredReferencedSchema {
                        class: class.to_string(),
                        field: field.to_string(),
                        referenced: referenced.to_string(),
                    }
                })?;
                Ok(PropertyNode::for_schema(schema))
            }
        }
    }
}
