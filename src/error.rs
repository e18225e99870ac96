//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! the failures a request can run into, from malformed payloads to database outages.
//!
//! `AppError` implements `actix_web::error::ResponseError` so every variant becomes a JSON
//! body with a stable `kind` tag and an `error` message. Validation failures additionally
//! carry their issue list and the projected field errors. Internal failures are logged and
//! replaced with a generic message so no backend detail reaches the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;

use crate::store::StoreError;
use crate::validation::{projection, Issues};

/// Message shown to clients in place of any internal error detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong.";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// The caller is not authenticated (HTTP 401).
    /// Protected routes redirect instead, so this only surfaces when a handler
    /// needing an identity is mounted outside the gate.
    Unauthorized(String),
    /// The request body could not be read as JSON (HTTP 400).
    BadRequest(String),
    /// The requested todo does not exist or is not owned by the caller (HTTP 404).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from the store (HTTP 500).
    DatabaseError(String),
    /// Structured field-level validation failure (HTTP 422 Unprocessable Entity).
    Validation(Issues),
}

impl AppError {
    /// Stable machine-readable tag written into every error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => "internal",
            AppError::Validation(_) => "validation",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            // The bare issue list, so string-only callers can parse it back.
            AppError::Validation(issues) => write!(f, "{}", issues.to_message()),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::Unauthorized(msg) | AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                response.json(json!({
                    "kind": self.kind(),
                    "error": msg
                }))
            }
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("{}: {}", self.kind(), msg);
                response.json(json!({
                    "kind": self.kind(),
                    "error": GENERIC_FAILURE_MESSAGE
                }))
            }
            AppError::Validation(issues) => response.json(json!({
                "kind": self.kind(),
                "error": issues.to_message(),
                "issues": issues,
                "fieldErrors": projection::project(issues.as_slice()),
            })),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

impl From<Issues> for AppError {
    fn from(issues: Issues) -> AppError {
        AppError::Validation(issues)
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
///
/// Only token verification goes through here; signing failures are internal
/// and mapped where they happen.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {:?}", error.kind()))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Issue;
    use actix_web::body::to_bytes;

    async fn body_json(error: AppError) -> serde_json::Value {
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Missing session".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Todo not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::Validation(Issues::default());
        assert_eq!(error.error_response().status(), 422);
    }

    #[actix_rt::test]
    async fn test_internal_errors_do_not_leak_detail() {
        let body = body_json(AppError::DatabaseError(
            "relation \"todos\" does not exist".into(),
        ))
        .await;
        assert_eq!(body["kind"], "internal");
        assert_eq!(body["error"], GENERIC_FAILURE_MESSAGE);
    }

    #[actix_rt::test]
    async fn test_validation_body_carries_issues_and_field_errors() {
        let issues = Issues::from(vec![Issue::field("name", "length", "Name is required.")]);
        let body = body_json(AppError::Validation(issues)).await;

        assert_eq!(body["kind"], "validation");
        assert_eq!(body["issues"][0]["path"][0], "name");
        assert_eq!(body["fieldErrors"]["name"][0], "Name is required.");

        let message = body["error"].as_str().unwrap();
        let projected = projection::field_errors_from_message(message).unwrap();
        assert_eq!(projected["name"], vec!["Name is required.".to_string()]);
    }

    #[test]
    fn test_library_errors_convert() {
        let error = AppError::from(bcrypt::BcryptError::CostNotAllowed(2));
        assert_eq!(error.kind(), "internal");

        let error = AppError::from(jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        ));
        match error {
            AppError::Unauthorized(msg) => assert!(msg.contains("ExpiredSignature")),
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validation_display_is_issue_json() {
        let error = AppError::from(Issues::from(vec![Issue::field(
            "email",
            "email",
            "Invalid email address.",
        )]));
        let parsed: serde_json::Value = serde_json::from_str(&error.to_string()).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed[0]["code"], "email");
    }
}
