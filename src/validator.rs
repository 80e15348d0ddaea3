//! Document validation entry points.

use serde_json::Value;

use crate::compiler::compile_schema;
use crate::error::{ErrorMessage, ValidateError};
use crate::schema::JsonSchema;

/// Validate a document against a schema document.
///
/// Compiles the schema, then validates the document against it.
///
/// # Errors
///
/// Returns `ValidateError::Load` if the schema cannot be compiled, or
/// `ValidateError::Invalid` carrying every violation if the document doesn't
/// conform.
pub fn validate(schema: &Value, document: &Value) -> Result<(), ValidateError> {
    let compiled = compile_schema(schema)?;
    validate_against_schema(&compiled, document)
}

/// Validate a document against an already-compiled schema.
///
/// Use this when you've already compiled the schema and want to validate
/// multiple documents against it.
pub fn validate_against_schema(schema: &JsonSchema, document: &Value) -> Result<(), ValidateError> {
    let errors: Vec<ErrorMessage> = schema.validate(document);
    tracing::debug!(errors = errors.len(), "validated document");

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}
