//! Class Schema
//!
//! Derive JSON Schema documents from declared model classes.
//!
//! Each field of a class is registered with its declared type and optional
//! constraints; finalizing the class produces an immutable schema. Classes
//! compose: a field typed as another finalized class becomes a `$ref` when
//! that class has an `$id`, or an inline copy of its schema when it does
//! not. A subclass starts from its parent's finalized fields.
//!
//! # Example
//!
//! ```
//! use class_schema::{
//!     DeclaredTypes, FieldDecl, FieldType, SchemaCatalog, SchemaMetadata, TypeDescriptor,
//! };
//! use serde_json::json;
//!
//! let types = DeclaredTypes::new()
//!     .field_of::<String>("A", "a")
//!     .field("B", "a", TypeDescriptor::class("A"))
//!     .field_of::<Vec<String>>("B", "tags");
//! let mut catalog = SchemaCatalog::new(types);
//!
//! catalog.register_field("A", FieldDecl::new("a")).unwrap();
//! catalog.finalize("A", Some(SchemaMetadata::new().id("A#ref"))).unwrap();
//!
//! catalog.register_field("B", FieldDecl::new("a")).unwrap();
//! catalog
//!     .register_field("B", FieldDecl::new("tags").of(FieldType::string()).optional())
//!     .unwrap();
//! let b = catalog.finalize("B", None).unwrap();
//!
//! assert_eq!(
//!     b.to_value(),
//!     json!({
//!         "type": "object",
//!         "required": ["a"],
//!         "properties": {
//!             "a": { "$ref": "A#ref" },
//!             "tags": { "type": "array", "items": { "type": "string" } }
//!         }
//!     })
//! );
//! assert_eq!(catalog.get_by_id("A#ref").unwrap().as_str(), "A");
//! ```
//!
//! # Field Rules
//!
//! | Declared type | Explicit type | Result |
//! |---------------|---------------|--------|
//! | primitive | (none) | `{"type": ...}` plus constraints |
//! | array | required | `{"type": "array", "items": ...}` plus array constraints |
//! | class with `$id` | (none) | `{"$ref": id}` |
//! | class without `$id` | (none) | inline copy of the class schema |
//! | opaque | required | node for the explicit type |
//!
//! A field is required unless its constraints say `"required": false`.

mod catalog;
mod compose;
mod error;
mod loader;
mod manifest;
mod property;
mod registry;
mod resolver;
mod types;
mod validator;

pub use catalog::SchemaCatalog;
pub use compose::{compose_schema, FinalSchema};
pub use error::{DeclareError, LoadError, PayloadError, RegistryError, ValidateError};
pub use loader::{is_url, load_json, load_json_auto, load_json_str};
pub use manifest::{
    load_manifest, load_manifest_auto, load_manifest_str, ClassDecl, FieldEntry, Manifest,
};
pub use property::{ClassAccumulator, FieldDecl, PropertyNode};
pub use registry::SchemaRegistry;
pub use resolver::{DeclaredTypes, DescribeType, TypeResolver};
pub use types::{
    ClassName, Constraints, FieldType, PrimitiveKind, SchemaMetadata, TypeDescriptor,
};
pub use validator::{validate, validate_against_schema, validation_schema};

#[cfg(feature = "remote")]
pub use loader::load_json_url;
#[cfg(feature = "remote")]
pub use manifest::load_manifest_url;
