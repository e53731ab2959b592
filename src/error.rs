//! Error types for schema declaration, lookup, loading and validation.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ClassName;

/// Errors while declaring fields or finalizing class schemas.
#[derive(Debug, Error)]
pub enum DeclareError {
    #[error("no type information for {class}.{field}: is the resolver configured for this class?")]
    MissingTypeInfo { class: String, field: String },

    #[error("{class}.{field} is an array of unknown type: an explicit item type is required")]
    MissingArrayItemType { class: String, field: String },

    #[error("{class}.{field} has an opaque type and cannot be described without an explicit type")]
    InvalidPropertyType { class: String, field: String },

    #[error("{class}.{field} uses {referenced}, which has no finalized schema yet")]
    UndeclaredReferencedSchema {
        class: String,
        field: String,
        referenced: String,
    },

    #[error("{class} extends {parent}, which has no finalized schema yet")]
    ParentNotFinalized { class: String, parent: String },

    #[error("{class} has no finalized schema")]
    NotFinalized { class: String },

    #[error("invalid constraints: expected object, got {actual}")]
    InvalidConstraints { actual: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl DeclareError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors from the identifier registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("schema id \"{id}\" is already bound to {existing}, cannot bind it to {class}")]
    DuplicateSchemaId {
        id: String,
        existing: ClassName,
        class: ClassName,
    },

    #[error("no schema registered under id \"{id}\"")]
    SchemaNotFound { id: String },
}

/// Errors while loading a declaration manifest or a payload.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Errors during payload validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Declare(#[from] DeclareError),

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<PayloadError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Declare(e) => e.exit_code(),
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PayloadError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("models.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = LoadError::InvalidJson { source };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn validate_error_exit_codes() {
        let err = ValidateError::Invalid {
            errors: vec![PayloadError {
                path: "/a".into(),
                message: "missing required field".into(),
            }],
        };
        assert_eq!(err.exit_code(), 1);

        let err = ValidateError::Declare(DeclareError::NotFinalized {
            class: "A".into(),
        });
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn registry_error_converts_into_declare_error() {
        let err: DeclareError = RegistryError::SchemaNotFound { id: "A#ref".into() }.into();
        assert!(matches!(
            err,
            DeclareError::Registry(RegistryError::SchemaNotFound { .. })
        ));
        assert_eq!(err.to_string(), "no schema registered under id \"A#ref\"");
    }

    #[test]
    fn duplicate_id_names_both_classes() {
        let err = RegistryError::DuplicateSchemaId {
            id: "shared".into(),
            existing: ClassName::from("A"),
            class: ClassName::from("B"),
        };
        let msg = err.to_string();
        assert!(msg.contains("A"));
        assert!(msg.contains("B"));
    }

    #[test]
    fn payload_error_display() {
        let err = PayloadError {
            path: "/owner/name".into(),
            message: "expected string, got number".into(),
        };
        assert_eq!(err.to_string(), "/owner/name: expected string, got number");
    }
}
