use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::Schema;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Lowercased, unique across users.
    pub email: String,
    /// Display name, derived from the email's local part at sign-up.
    pub name: String,
    /// Bcrypt hash, never exposed in JSON.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user record from an already normalized email and a password hash.
    pub fn new(email: String, password_hash: String) -> Self {
        let name = display_name(&email);
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// The part of an email address before the `@`.
pub fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

/// Lowercases and trims an email so lookups and the unique constraint agree.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Raw payload of a registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(
        required(message = "Email is required."),
        email(message = "Invalid email address."),
        length(min = 1, message = "Email is required.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Password is required."),
        length(min = 7, message = "Password must be at least 7 characters.")
    )]
    pub password: Option<String>,
}

/// A validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
}

impl Schema for Registration {
    type Raw = RegisterInput;
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("email", "email"), ("password", "password")];

    fn from_raw(raw: RegisterInput) -> Self {
        Self {
            email: raw.email.unwrap_or_default(),
            password: raw.password.unwrap_or_default(),
        }
    }
}

/// Raw payload of a login request. The password is only required to be present.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(
        required(message = "Email is required."),
        email(message = "Invalid email address."),
        length(min = 1, message = "Email is required.")
    )]
    pub email: Option<String>,
    #[validate(required(message = "Password is required."))]
    pub password: Option<String>,
}

/// Validated login credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Schema for Credentials {
    type Raw = LoginInput;
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("email", "email"), ("password", "password")];

    fn from_raw(raw: LoginInput) -> Self {
        Self {
            email: raw.email.unwrap_or_default(),
            password: raw.password.unwrap_or_default(),
        }
    }
}
