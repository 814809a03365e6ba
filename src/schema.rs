use jsonschema::validator_for;
use serde_json::Value;

/// Frozen JSON Schema (draft 2020-12) for the `RewriteResult` wire shape.
///
/// The field set is exact: five keys, `alternatives` capped at two entries,
/// `confidence` bounded to [0.0, 1.0].
pub const REWRITE_RESULT_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "Rewrite Result v0",
  "type": "object",
  "required": ["summary", "root_causes", "suggested_prompt", "alternatives", "confidence"],
  "additionalProperties": false,
  "properties": {
    "summary": { "type": "string" },
    "root_causes": {
      "type": "array",
      "items": { "type": "string" }
    },
    "suggested_prompt": { "type": "string", "minLength": 1 },
    "alternatives": {
      "type": "array",
      "items": { "type": "string" },
      "maxItems": 2
    },
    "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 }
  }
}"#;

#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    #[error("Instance validation failed")]
    ValidationFailed,
}

/// Validate a JSON instance against a JSON Schema (draft 2020-12).
/// Returns Ok(()) if valid, Err otherwise.
pub fn validate_json(schema_str: &str, instance_str: &str) -> Result<(), SchemaValidationError> {
    let schema_json: Value = serde_json::from_str(schema_str)?;
    let instance_json: Value = serde_json::from_str(instance_str)?;

    let validator = validator_for(&schema_json)
        .map_err(|e| SchemaValidationError::SchemaCompile(e.to_string()))?;

    if validator.is_valid(&instance_json) {
        Ok(())
    } else {
        Err(SchemaValidationError::ValidationFailed)
    }
}

/// Validate a serialized tool result against [`REWRITE_RESULT_SCHEMA`].
pub fn validate_rewrite_result(instance_str: &str) -> Result<(), SchemaValidationError> {
    validate_json(REWRITE_RESULT_SCHEMA, instance_str)
}
