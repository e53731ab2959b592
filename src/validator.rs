//! Payload validation against finalized class schemas.

use serde_json::Value;

use crate::catalog::SchemaCatalog;
use crate::error::{PayloadError, ValidateError};

/// Keys dropped from bundled schemas before handing them to the validator.
const IDENTITY_KEYWORDS: &[&str] = &["$id", "$schema"];

/// Bundled schema of `class` with `$id` and `$schema` removed from the root
/// and every inlined class schema.
///
/// Identifiers such as `"A#ref"` carry fragments that newer drafts reject,
/// and once every reference is inlined they serve no purpose.
///
/// # Errors
///
/// Returns `ValidateError::Declare` if `class` cannot be bundled.
pub fn validation_schema<R>(
    catalog: &SchemaCatalog<R>,
    class: &str,
) -> Result<Value, ValidateError> {
    let mut schema = catalog.bundle(class)?;
    strip_identity(&mut schema);
    Ok(schema)
}

/// Walks schema positions only: the node itself, its property schemas and
/// its `items`. Property names and constraint values are left alone.
fn strip_identity(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };
    for key in IDENTITY_KEYWORDS {
        map.remove(*key);
    }
    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        for child in properties.values_mut() {
            strip_identity(child);
        }
    }
    if let Some(items) = map.get_mut("items") {
        strip_identity(items);
    }
}

/// Validate a payload against the schema of `class`.
///
/// # Errors
///
/// Returns `ValidateError::Declare` if the schema can't be built, or
/// `ValidateError::Invalid` if the payload doesn't match the schema.
pub fn validate<R>(
    catalog: &SchemaCatalog<R>,
    class: &str,
    payload: &Value,
) -> Result<(), ValidateError> {
    let schema = validation_schema(catalog, class)?;
    validate_against_schema(&schema, payload)
}

/// Validate a payload against an already-built schema.
///
/// Use this when validating many payloads against the same class.
pub fn validate_against_schema(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
        message: e.to_string(),
    })?;

    let errors: Vec<PayloadError> = validator
        .iter_errors(payload)
        .map(|e| PayloadError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeclareError;
    use crate::property::FieldDecl;
    use crate::resolver::DeclaredTypes;
    use crate::types::{Constraints, FieldType, SchemaMetadata, TypeDescriptor};
    use serde_json::json;

    fn pets() -> SchemaCatalog {
        let types = DeclaredTypes::new()
            .field_of::<String>("Owner", "name")
            .field("Pet", "owner", TypeDescriptor::class("Owner"))
            .field_of::<Vec<String>>("Pet", "tags");
        let mut catalog = SchemaCatalog::new(types);
        catalog
            .register_field(
                "Owner",
                FieldDecl::new("name").constraints(Constraints::new().with("minLength", 1)),
            )
            .unwrap();
        catalog
            .finalize(
                "Owner",
                Some(
                    SchemaMetadata::new()
                        .id("Owner#ref")
                        .schema("http://json-schema.org/draft-04/schema#"),
                ),
            )
            .unwrap();
        catalog.register_field("Pet", FieldDecl::new("owner")).unwrap();
        catalog
            .register_field(
                "Pet",
                FieldDecl::new("tags")
                    .of(FieldType::string())
                    .array_constraints(Constraints::new().with("maxItems", 2))
                    .optional(),
            )
            .unwrap();
        catalog.finalize("Pet", None).unwrap();
        catalog
    }

    #[test]
    fn validation_schema_has_no_identity_keys() {
        let schema = validation_schema(&pets(), "Pet").unwrap();
        assert_eq!(
            schema["properties"]["owner"],
            json!({
                "type": "object",
                "required": ["name"],
                "properties": { "name": { "type": "string", "minLength": 1 } }
            })
        );
    }

    #[test]
    fn validate_valid_payload() {
        let payload = json!({ "owner": { "name": "Ada" }, "tags": ["cat"] });
        assert!(validate(&pets(), "Pet", &payload).is_ok());
    }

    #[test]
    fn validate_missing_required_field() {
        let payload = json!({ "tags": [] });
        let result = validate(&pets(), "Pet", &payload);
        assert!(matches!(result, Err(ValidateError::Invalid { .. })));
    }

    #[test]
    fn validate_nested_constraint() {
        let payload = json!({ "owner": { "name": "" } });
        match validate(&pets(), "Pet", &payload) {
            Err(ValidateError::Invalid { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "/owner/name");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let payload = json!({ "owner": { "name": 1 }, "tags": ["a", "b", "c"] });
        match validate(&pets(), "Pet", &payload) {
            Err(ValidateError::Invalid { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected 2 validation errors, got {:?}", other),
        }
    }

    #[test]
    fn field_named_like_identity_keyword_is_kept() {
        let types = DeclaredTypes::new()
            .field_of::<String>("Doc", "$id")
            .field_of::<String>("Doc", "name");
        let mut catalog = SchemaCatalog::new(types);
        catalog.register_field("Doc", FieldDecl::new("$id")).unwrap();
        catalog
            .register_field(
                "Doc",
                FieldDecl::new("name").constraints(
                    Constraints::new().with("default", json!({ "$id": "x", "$schema": "y" })),
                ),
            )
            .unwrap();
        catalog
            .finalize("Doc", Some(SchemaMetadata::new().id("Doc#ref")))
            .unwrap();

        let schema = validation_schema(&catalog, "Doc").unwrap();
        assert!(schema.get("$id").is_none());
        assert_eq!(schema["properties"]["$id"], json!({ "type": "string" }));
        assert_eq!(
            schema["properties"]["name"]["default"],
            json!({ "$id": "x", "$schema": "y" })
        );

        let result = validate(&catalog, "Doc", &json!({ "$id": 5, "name": "x" }));
        match result {
            Err(ValidateError::Invalid { errors }) => assert_eq!(errors[0].path, "/$id"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(validate(&catalog, "Doc", &json!({ "$id": "d1", "name": "x" })).is_ok());
    }

    #[test]
    fn validate_unknown_class() {
        let result = validate(&pets(), "Cat", &json!({}));
        assert!(matches!(
            result,
            Err(ValidateError::Declare(DeclareError::NotFinalized { .. }))
        ));
    }
}
