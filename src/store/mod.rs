//! Persistence contracts for users, sessions, and todos.
//!
//! Handlers only see these traits. `PgStore` backs them with PostgreSQL and
//! `MemoryStore` keeps everything in process, which the integration tests use.
//! Every todo operation takes the owner's id and only touches rows it owns.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use crate::models::{Todo, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store implementation.
#[derive(Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    Conflict(String),
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StoreError::Backend(msg) => write!(f, "Store failure: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Unique violations become `Conflict`; everything else is a backend failure.
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.code().as_deref() == Some("23505") {
                return StoreError::Conflict(db_error.message().to_string());
            }
        }
        StoreError::Backend(error.to_string())
    }
}

/// A server-side session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Users and their sessions, as needed by the identity provider.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. A taken email yields `StoreError::Conflict`.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn insert_session(&self, session: &SessionRecord) -> StoreResult<()>;
    async fn find_session(&self, id: Uuid) -> StoreResult<Option<SessionRecord>>;
    /// Returns whether a session was removed.
    async fn delete_session(&self, id: Uuid) -> StoreResult<bool>;
    /// Removes `user_id`'s sessions that expired at or before `now`.
    async fn delete_expired_sessions(&self, user_id: Uuid, now: DateTime<Utc>)
        -> StoreResult<u64>;
}

/// Owner-scoped todo persistence.
///
/// The mutating methods return whether a row owned by `user_id` matched.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert_todo(&self, todo: &Todo) -> StoreResult<()>;
    /// All todos of `user_id`, oldest first.
    async fn list_todos(&self, user_id: Uuid) -> StoreResult<Vec<Todo>>;
    async fn find_todo(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Todo>>;
    async fn rename_todo(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<bool>;
    async fn set_todo_complete(&self, user_id: Uuid, id: Uuid, is_complete: bool)
        -> StoreResult<bool>;
    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = SessionRecord::new(Uuid::new_v4(), now + Duration::hours(1));
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::hours(2)));
    }

    #[test]
    fn test_row_not_found_is_backend_error() {
        match StoreError::from(sqlx::Error::RowNotFound) {
            StoreError::Backend(_) => {}
            other => panic!("Unexpected store error: {:?}", other),
        }
    }
}
