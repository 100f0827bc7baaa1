//! Instance validation against the schema active in a resolution context.

use serde_json::Value;

use crate::context::ResolutionContext;
use crate::error::{ResolveError, SchemaError, ValidateError};
use crate::types::DialectVersion;

/// Map a detected dialect onto the validation backend's drafts.
fn backend_draft(version: DialectVersion) -> Option<jsonschema::Draft> {
    match version {
        DialectVersion::Draft3 => None,
        DialectVersion::Draft4 => Some(jsonschema::Draft::Draft4),
        DialectVersion::Draft6 => Some(jsonschema::Draft::Draft6),
        DialectVersion::Draft7 => Some(jsonschema::Draft::Draft7),
        DialectVersion::Draft201909 => Some(jsonschema::Draft::Draft201909),
        DialectVersion::Draft202012 => Some(jsonschema::Draft::Draft202012),
    }
}

/// Validate an instance against the context's active schema.
///
/// The draft is the one detected for the active document. `$ref`s inside
/// the active document are left to the backend; use
/// [`ResolutionContext::follow_ref`] to move the context itself.
///
/// # Errors
///
/// Returns `ValidateError::UnsupportedDialect` for draft 3,
/// `ValidateError::Resolve` if the backend rejects the schema, or
/// `ValidateError::Invalid` with every violation found.
pub fn validate(context: &ResolutionContext, instance: &Value) -> Result<(), ValidateError> {
    let version = context.version();
    let draft = backend_draft(version).ok_or_else(|| ValidateError::UnsupportedDialect {
        dialect: version.to_string(),
    })?;

    validate_with_draft(context.document(), instance, draft)
}

fn validate_with_draft(
    schema: &Value,
    instance: &Value,
    draft: jsonschema::Draft,
) -> Result<(), ValidateError> {
    let validator = jsonschema::options()
        .with_draft(draft)
        .build(schema)
        .map_err(|e| {
            ValidateError::Resolve(ResolveError::InvalidSchema {
                message: e.to_string(),
            })
        })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(instance)
        .map(|e| SchemaError {
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
