//! Identifier registry.
//!
//! Maps a schema `$id` to the class that owns it. An id may be rebound to
//! the class already holding it, never to another one. Entries persist until
//! the registry is cleared or dropped.

use std::collections::BTreeMap;

use crate::error::RegistryError;
use crate::types::ClassName;

/// Map from schema identifier to owning class.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: BTreeMap<String, ClassName>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `id` to `class`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateSchemaId` if `id` is already bound to
    /// a different class.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        class: impl Into<ClassName>,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        let class = class.into();

        match self.entries.get(&id) {
            Some(existing) if *existing == class => {
                tracing::debug!(%id, %class, "schema id already bound to this class");
                Ok(())
            }
            Some(existing) => Err(RegistryError::DuplicateSchemaId {
                id,
                existing: existing.clone(),
                class,
            }),
            None => {
                tracing::debug!(%id, %class, "bound schema id");
                self.entries.insert(id, class);
                Ok(())
            }
        }
    }

    /// Class bound to `id`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` if `id` is unbound.
    pub fn get_by_id(&self, id: &str) -> Result<&ClassName, RegistryError> {
        self.entries
            .get(id)
            .ok_or_else(|| RegistryError::SchemaNotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bindings sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassName)> {
        self.entries.iter().map(|(id, class)| (id.as_str(), class))
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registry_is_empty() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = SchemaRegistry::new();
        registry.register("A#ref", "A").unwrap();

        assert_eq!(registry.get_by_id("A#ref").unwrap().as_str(), "A");
        assert!(registry.contains("A#ref"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rebinding_same_class_is_noop() {
        let mut registry = SchemaRegistry::new();
        registry.register("A#ref", "A").unwrap();
        registry.register("A#ref", "A").unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rebinding_other_class_fails() {
        let mut registry = SchemaRegistry::new();
        registry.register("shared", "A").unwrap();

        let err = registry.register("shared", "B").unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateSchemaId {
                id: "shared".into(),
                existing: ClassName::from("A"),
                class: ClassName::from("B"),
            }
        );
        // Original binding survives
        assert_eq!(registry.get_by_id("shared").unwrap().as_str(), "A");
    }

    #[test]
    fn unknown_id_not_found() {
        let registry = SchemaRegistry::new();
        assert_eq!(
            registry.get_by_id("missing").unwrap_err(),
            RegistryError::SchemaNotFound {
                id: "missing".into()
            }
        );
    }

    #[test]
    fn iter_sorted_by_id() {
        let mut registry = SchemaRegistry::new();
        registry.register("b", "B").unwrap();
        registry.register("a", "A").unwrap();

        let ids: Vec<&str> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn clear_resets_bindings() {
        let mut registry = SchemaRegistry::new();
        registry.register("shared", "A").unwrap();
        registry.clear();

        assert!(registry.is_empty());
        registry.register("shared", "B").unwrap();
        assert_eq!(registry.get_by_id("shared").unwrap().as_str(), "B");
    }
}
