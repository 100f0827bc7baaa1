//! Dialect detection for schema documents.

use serde_json::Value;

use crate::error::ResolveError;
use crate::types::{json_type_name, DialectVersion};

/// Check that a value can serve as a schema document.
///
/// # Errors
///
/// Returns `ResolveError::InvalidSchema` for `null` and every non-object value.
pub fn ensure_schema(document: &Value) -> Result<(), ResolveError> {
    match document {
        Value::Object(_) => Ok(()),
        Value::Null => Err(ResolveError::invalid_schema("schema is null")),
        other => Err(ResolveError::invalid_schema(format!(
            "expected an object, got {}",
            json_type_name(other)
        ))),
    }
}

/// Detect the dialect a document declares through `$schema`.
///
/// Falls back to `default_version` when the marker is absent, not a string,
/// or not a known dialect URI.
///
/// # Errors
///
/// Returns `ResolveError::InvalidSchema` if the document is not an object.
pub fn detect(
    document: &Value,
    default_version: DialectVersion,
) -> Result<DialectVersion, ResolveError> {
    ensure_schema(document)?;

    let declared = document
        .get("$schema")
        .and_then(Value::as_str)
        .and_then(DialectVersion::from_marker);

    Ok(declared.unwrap_or(default_version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detect_declared_dialect_wins_over_default() {
        let schema = json!({ "$schema": "http://json-schema.org/draft-03/schema#" });
        let version = detect(&schema, DialectVersion::Draft7).unwrap();
        assert_eq!(version, DialectVersion::Draft3);
    }

    #[test]
    fn detect_without_marker_uses_default() {
        let schema = json!({ "type": "string" });
        assert_eq!(
            detect(&schema, DialectVersion::Draft4).unwrap(),
            DialectVersion::Draft4
        );
        assert_eq!(
            detect(&schema, DialectVersion::Draft202012).unwrap(),
            DialectVersion::Draft202012
        );
    }

    #[test]
    fn detect_unrecognized_marker_uses_default() {
        let schema = json!({ "$schema": "http://example.com/custom-meta#" });
        assert_eq!(
            detect(&schema, DialectVersion::Draft6).unwrap(),
            DialectVersion::Draft6
        );

        let schema = json!({ "$schema": 4 });
        assert_eq!(
            detect(&schema, DialectVersion::Draft6).unwrap(),
            DialectVersion::Draft6
        );
    }

    #[test]
    fn detect_rejects_null() {
        let result = detect(&Value::Null, DialectVersion::Draft4);
        assert!(matches!(
            result,
            Err(ResolveError::InvalidSchema { message }) if message == "schema is null"
        ));
    }

    #[test]
    fn detect_rejects_non_objects() {
        for value in [json!(true), json!(1), json!("s"), json!([{}])] {
            let result = detect(&value, DialectVersion::Draft4);
            assert!(matches!(result, Err(ResolveError::InvalidSchema { .. })));
        }
    }
}
