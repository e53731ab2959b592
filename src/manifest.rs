//! Declaration manifests.
//!
//! A manifest lists classes in declaration order, so schemas can be derived
//! without writing Rust:
//!
//! ```json
//! {
//!   "classes": [
//!     {
//!       "name": "Owner",
//!       "metadata": { "$id": "Owner#ref" },
//!       "fields": [
//!         { "name": "name", "type": "string", "constraints": { "minLength": 1 } }
//!       ]
//!     },
//!     {
//!       "name": "Pet",
//!       "fields": [
//!         { "name": "owner", "type": "Owner" },
//!         { "name": "tags", "type": "array", "items": "string",
//!           "arrayConstraints": { "maxItems": 5 } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Declared types are `number`, `string`, `boolean`, `array`, `object`
//! (opaque), or the name of another class.

use std::path::Path;

use serde::Deserialize;

use crate::catalog::SchemaCatalog;
use crate::error::{DeclareError, LoadError};
use crate::loader::{load_json, load_json_auto, load_json_str};
#[cfg(feature = "remote")]
use crate::loader::load_json_url;
use crate::property::FieldDecl;
use crate::resolver::DeclaredTypes;
use crate::types::{Constraints, FieldType, SchemaMetadata, TypeDescriptor};

/// Classes to declare, in order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub classes: Vec<ClassDecl>,
}

/// One class of a manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub metadata: Option<SchemaMetadata>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

/// One field of a manifest class.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldEntry {
    pub name: String,
    /// Declared type, as the resolver will report it.
    #[serde(rename = "type")]
    pub declared: String,
    /// Explicit item type (arrays) or type hint (opaque fields).
    #[serde(default)]
    pub items: Option<String>,
    #[serde(default)]
    pub constraints: Option<Constraints>,
    #[serde(default, rename = "arrayConstraints")]
    pub array_constraints: Option<Constraints>,
}

impl FieldEntry {
    fn to_decl(&self) -> FieldDecl {
        FieldDecl {
            name: self.name.clone(),
            explicit_type: self.items.as_deref().map(FieldType::parse),
            constraints: self.constraints.clone(),
            array_constraints: self.array_constraints.clone(),
        }
    }
}

impl Manifest {
    /// Class names in declaration order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    /// Declared types of every field, as a resolver.
    pub fn declared_types(&self) -> DeclaredTypes {
        let mut types = DeclaredTypes::new();
        for class in &self.classes {
            for field in &class.fields {
                types.declare(
                    class.name.as_str(),
                    field.name.as_str(),
                    TypeDescriptor::parse(&field.declared),
                );
            }
        }
        types
    }

    /// Declare and finalize every class in order.
    ///
    /// # Errors
    ///
    /// Returns the first `DeclareError` hit; classes are processed strictly
    /// in manifest order, so a class must appear after any class it uses.
    pub fn build(&self) -> Result<SchemaCatalog, DeclareError> {
        let mut catalog = SchemaCatalog::new(self.declared_types());

        for class in &self.classes {
            if let Some(parent) = &class.extends {
                catalog.extends(class.name.as_str(), parent.as_str());
            }
            for field in &class.fields {
                catalog.register_field(class.name.as_str(), field.to_decl())?;
            }
            catalog.finalize(class.name.as_str(), class.metadata.clone())?;
        }

        tracing::debug!(classes = self.classes.len(), "built catalog from manifest");
        Ok(catalog)
    }
}

/// Load a manifest from a file.
///
/// # Errors
///
/// Returns `LoadError` if the file is missing or isn't a valid manifest.
pub fn load_manifest(path: &Path) -> Result<Manifest, LoadError> {
    load_json(path)
}

/// Load a manifest from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't a valid manifest.
pub fn load_manifest_str(content: &str) -> Result<Manifest, LoadError> {
    load_json_str(content)
}

/// Fetch a manifest over HTTP/HTTPS.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the body isn't
/// a valid manifest.
#[cfg(feature = "remote")]
pub fn load_manifest_url(url: &str) -> Result<Manifest, LoadError> {
    load_json_url(url)
}

/// Load a manifest from a file path or URL.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_manifest_auto(source: &str) -> Result<Manifest, LoadError> {
    load_json_auto(source)
}
