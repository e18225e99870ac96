//! Projection of validation failures into per-field message lists.
//!
//! Two entry points exist because errors reach the presentation layer in two
//! shapes: the tagged JSON body written by `AppError`, and a bare message
//! string. Anything that does not look like a validation failure projects to
//! `None` so the caller can fall back to a generic failure display.

use std::collections::BTreeMap;

use serde_json::Value;

use super::Issue;

/// Field name to its messages, in the order they were reported.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Groups issues by their first path segment. Root-level issues are skipped.
pub fn project(issues: &[Issue]) -> FieldErrors {
    let mut field_errors = FieldErrors::new();
    for issue in issues {
        if let Some(field) = issue.path.first() {
            field_errors
                .entry(field.clone())
                .or_default()
                .push(issue.message.clone());
        }
    }
    field_errors
}

/// Returns true when `message` is a JSON array of issues whose first element
/// carries a `code`.
pub fn is_validation_message(message: &str) -> bool {
    match serde_json::from_str::<Value>(message) {
        Ok(Value::Array(items)) => items
            .first()
            .and_then(Value::as_object)
            .map_or(false, |first| first.contains_key("code")),
        _ => false,
    }
}

/// Projects an error message string, if it carries a validation issue list.
pub fn field_errors_from_message(message: &str) -> Option<FieldErrors> {
    if !is_validation_message(message) {
        return None;
    }
    let issues: Vec<Issue> = serde_json::from_str(message).ok()?;
    Some(project(&issues))
}

/// Projects a JSON error body produced by `AppError`, if it is tagged as a
/// validation failure.
pub fn field_errors_from_body(body: &Value) -> Option<FieldErrors> {
    if body.get("kind").and_then(Value::as_str) != Some("validation") {
        return None;
    }
    let issues: Vec<Issue> = serde_json::from_value(body.get("issues")?.clone()).ok()?;
    if issues.is_empty() {
        return None;
    }
    Some(project(&issues))
}
