//! Schema-based validation of untrusted request payloads.
//!
//! A payload must be a JSON object. Each of its members is decoded against the
//! schema's raw input type on its own (every field is an `Option`, so a missing
//! field is reported as a field issue rather than a decode failure), and a
//! member of the wrong JSON type becomes an `invalid_type` issue at its key.
//! The remaining members are checked with the `validator` derive rules declared
//! on the raw type. Failures are flattened into an ordered [`Issues`] list:
//! fields in declaration order, messages within a field in the order the checks
//! fired.

pub mod extract;
pub mod projection;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

pub use extract::Validated;
pub use projection::FieldErrors;

/// Issue code for a payload or member of the wrong JSON type.
pub const INVALID_TYPE: &str = "invalid_type";

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Machine-readable rule name (`required`, `email`, `length`, ...).
    pub code: String,
    /// Path to the offending value. One segment naming the payload key, or
    /// empty when the payload as a whole was malformed.
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn field(field: &str, code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            path: vec![field.to_string()],
            message: message.to_string(),
        }
    }

    fn root(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            path: Vec::new(),
            message,
        }
    }
}

/// Ordered list of validation issues for one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Issues(Vec<Issue>);

impl Issues {
    pub fn as_slice(&self) -> &[Issue] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// JSON array form of the issues, as carried across string-only boundaries.
    pub fn to_message(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    /// Flattens `validator` output into issues ordered by `fields`.
    ///
    /// `fields` pairs each struct field name with the payload key it is
    /// reported under. Errors for fields not listed are appended afterwards,
    /// sorted by name, so nothing is dropped.
    pub fn from_validation(errors: &ValidationErrors, fields: &[(&str, &str)]) -> Self {
        let by_field = errors.errors();
        let mut issues = Vec::new();

        for (field, key) in fields {
            let kind = by_field.get(*field).or_else(|| by_field.get(*key));
            if let Some(ValidationErrorsKind::Field(list)) = kind {
                issues.extend(list.iter().map(|error| issue_for(key, error)));
            }
        }

        let mut unlisted: Vec<_> = by_field
            .iter()
            .filter(|(name, _)| !fields.iter().any(|(f, k)| f == *name || k == *name))
            .collect();
        unlisted.sort_by_key(|(name, _)| **name);
        for (name, kind) in unlisted {
            if let ValidationErrorsKind::Field(list) = kind {
                issues.extend(list.iter().map(|error| issue_for(name, error)));
            }
        }

        Self(issues)
    }

    fn from_decode(error: serde_json::Error) -> Self {
        Self(vec![Issue::root(
            INVALID_TYPE,
            format!("Invalid input: {}", error),
        )])
    }

    fn not_an_object(payload: &Value) -> Self {
        Self(vec![Issue::root(
            INVALID_TYPE,
            format!("Invalid input: expected object, received {}", json_type(payload)),
        )])
    }

    /// Interleaves type issues with rule issues so each field's issues stay
    /// together, in `fields` order. Rule issues for mistyped keys are dropped.
    fn merge(mut mistyped: Vec<Issue>, rules: Issues, fields: &[(&str, &str)]) -> Self {
        let mut rules: Vec<Issue> = rules
            .0
            .into_iter()
            .filter(|issue| !mistyped.iter().any(|m| m.path == issue.path))
            .collect();
        let mut issues = Vec::with_capacity(mistyped.len() + rules.len());

        for (_, key) in fields {
            let at_key = |issue: &Issue| issue.path.len() == 1 && issue.path[0] == *key;
            issues.extend(mistyped.iter().filter(|i| at_key(*i)).cloned());
            issues.extend(rules.iter().filter(|i| at_key(*i)).cloned());
            mistyped.retain(|i| !at_key(i));
            rules.retain(|i| !at_key(i));
        }
        issues.extend(mistyped);
        issues.extend(rules);

        Self(issues)
    }
}

impl From<Vec<Issue>> for Issues {
    fn from(issues: Vec<Issue>) -> Self {
        Self(issues)
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn issue_for(key: &str, error: &ValidationError) -> Issue {
    let message = match &error.message {
        Some(message) => message.to_string(),
        None => format!("Invalid value for {}.", key),
    };
    Issue::field(key, &error.code, &message)
}

/// A named request schema.
///
/// Implementors are the typed, already-validated form of a payload; `Raw` is
/// the permissive shape the payload is decoded into before the rules run.
pub trait Schema: Sized {
    type Raw: DeserializeOwned + Validate;

    /// `(struct field, payload key)` pairs in declaration order.
    const FIELDS: &'static [(&'static str, &'static str)];

    /// Builds the typed value. Only called once `raw.validate()` succeeded.
    fn from_raw(raw: Self::Raw) -> Self;

    /// Validates a raw JSON payload against this schema.
    fn validate(payload: Value) -> Result<Self, Issues> {
        let members = match payload {
            Value::Object(members) => members,
            other => return Err(Issues::not_an_object(&other)),
        };

        let mut mistyped = Vec::new();
        let mut accepted = Map::new();
        for (key, value) in members {
            let mut single = Map::new();
            single.insert(key.clone(), value);
            match serde_json::from_value::<Self::Raw>(Value::Object(single.clone())) {
                Ok(_) => accepted.extend(single),
                Err(error) => mistyped.push(Issue::field(
                    &key,
                    INVALID_TYPE,
                    &format!("Invalid input: {}", error),
                )),
            }
        }

        let raw: Self::Raw =
            serde_json::from_value(Value::Object(accepted)).map_err(Issues::from_decode)?;
        let rules = match raw.validate() {
            Ok(()) => Issues::default(),
            Err(errors) => Issues::from_validation(&errors, Self::FIELDS),
        };

        if mistyped.is_empty() && rules.is_empty() {
            Ok(Self::from_raw(raw))
        } else {
            Err(Issues::merge(mistyped, rules, Self::FIELDS))
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Credentials, NewTodo, Registration, TodoRename, TodoToggle};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn keys(issues: &Issues) -> Vec<String> {
        issues
            .as_slice()
            .iter()
            .map(|issue| issue.path.join("."))
            .collect()
    }

    #[test]
    fn test_register_schema_accepts_valid_payload() {
        let registration =
            Registration::validate(json!({ "email": "a@b.com", "password": "12345678" })).unwrap();
        assert_eq!(registration.email, "a@b.com");
        assert_eq!(registration.password, "12345678");
    }

    #[test]
    fn test_register_schema_reports_missing_fields_in_order() {
        let issues = Registration::validate(json!({})).unwrap_err();
        assert_eq!(keys(&issues), vec!["email", "password"]);
        assert!(issues.as_slice().iter().all(|i| i.code == "required"));
    }

    #[test]
    fn test_register_schema_rejects_short_password() {
        let payload = json!({ "email": "a@b.com", "password": "123456" });
        let issues = Registration::validate(payload).unwrap_err();
        assert_eq!(keys(&issues), vec!["password"]);
        assert_eq!(issues.as_slice()[0].code, "length");
    }

    #[test]
    fn test_empty_email_accumulates_every_message() {
        let issues =
            Registration::validate(json!({ "email": "", "password": "password1" })).unwrap_err();
        let messages: Vec<&str> = issues
            .as_slice()
            .iter()
            .filter(|i| i.path == ["email"])
            .map(|i| i.message.as_str())
            .collect();
        assert_eq!(messages.len(), 2);
        assert!(messages.contains(&"Email is required."));
        assert!(messages.contains(&"Invalid email address."));
    }

    #[test]
    fn test_login_schema_allows_any_password() {
        let credentials =
            Credentials::validate(json!({ "email": "a@b.com", "password": "" })).unwrap();
        assert_eq!(credentials.password, "");

        let issues = Credentials::validate(json!({ "email": "a@b.com" })).unwrap_err();
        assert_eq!(keys(&issues), vec!["password"]);
    }

    #[test]
    fn test_todo_schemas() {
        assert!(NewTodo::validate(json!({ "name": "Buy milk" })).is_ok());

        let issues = NewTodo::validate(json!({ "name": "" })).unwrap_err();
        assert_eq!(issues.as_slice()[0].message, "Name is required.");

        let issues = TodoRename::validate(json!({ "name": "" })).unwrap_err();
        assert_eq!(keys(&issues), vec!["id", "name"]);

        let issues = TodoToggle::validate(json!({ "id": "" })).unwrap_err();
        assert_eq!(keys(&issues), vec!["id", "isComplete"]);

        let toggle = TodoToggle::validate(json!({ "id": "x", "isComplete": true })).unwrap();
        assert!(toggle.is_complete);
    }

    #[test]
    fn test_undecodable_payload_is_a_root_issue() {
        for payload in [json!(["Buy milk"]), json!("Buy milk"), json!(null), json!(5)] {
            let issues = NewTodo::validate(payload.clone()).unwrap_err();
            assert_eq!(issues.len(), 1, "payload {}", payload);
            assert_eq!(issues.as_slice()[0].code, INVALID_TYPE);
            assert!(issues.as_slice()[0].path.is_empty());
        }

        let issues = Registration::validate(json!(["a@b.com", "password1"])).unwrap_err();
        assert_eq!(issues.as_slice()[0].code, INVALID_TYPE);
        assert!(projection::project(issues.as_slice()).is_empty());
    }

    #[test]
    fn test_mistyped_field_is_reported_at_its_key() {
        let issues = NewTodo::validate(json!({ "name": 5 })).unwrap_err();
        assert_eq!(keys(&issues), vec!["name"]);
        assert_eq!(issues.as_slice()[0].code, INVALID_TYPE);

        let issues = TodoToggle::validate(json!({ "id": "x", "isComplete": "yes" })).unwrap_err();
        assert_eq!(keys(&issues), vec!["isComplete"]);
        assert_eq!(issues.as_slice()[0].code, INVALID_TYPE);
    }

    #[test]
    fn test_mistyped_field_keeps_other_fields_issues() {
        let issues =
            Registration::validate(json!({ "email": "bad", "password": 12345678 })).unwrap_err();
        assert_eq!(keys(&issues), vec!["email", "password"]);
        assert_eq!(issues.as_slice()[0].code, "email");
        assert_eq!(issues.as_slice()[1].code, INVALID_TYPE);

        let fields = projection::project(issues.as_slice());
        assert_eq!(fields["email"], vec!["Invalid email address.".to_string()]);
        assert_eq!(fields["password"].len(), 1);

        // The mistyped key is not also reported as missing.
        let issues = TodoRename::validate(json!({ "id": 7, "name": "" })).unwrap_err();
        assert_eq!(keys(&issues), vec!["id", "name"]);
        assert_eq!(issues.as_slice()[0].code, INVALID_TYPE);
        assert_eq!(issues.as_slice()[1].message, "Name is required.");
    }
}
