use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SessionRecord, StoreError, StoreResult, TodoStore, UserStore};
use crate::models::{Todo, User};

/// In-process store with the same scoping rules as `PgStore`.
///
/// Todos keep insertion order, which matches `created_at` ordering for rows
/// created through the API.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    sessions: RwLock<HashMap<Uuid, SessionRecord>>,
    todos: RwLock<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of todos across all owners.
    pub async fn todo_count(&self) -> usize {
        self.todos.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn insert_session(&self, session: &SessionRecord) -> StoreResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn find_session(&self, id: Uuid) -> StoreResult<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn delete_session(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn delete_expired_sessions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !(session.user_id == user_id && session.is_expired(now)));
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert_todo(&self, todo: &Todo) -> StoreResult<()> {
        let mut todos = self.todos.write().await;
        if todos.iter().any(|existing| existing.id == todo.id) {
            return Err(StoreError::Conflict(format!("todo {} already exists", todo.id)));
        }
        todos.push(todo.clone());
        Ok(())
    }

    async fn list_todos(&self, user_id: Uuid) -> StoreResult<Vec<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .filter(|todo| todo.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_todo(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .find(|todo| todo.id == id && todo.user_id == user_id)
            .cloned())
    }

    async fn rename_todo(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<bool> {
        let mut todos = self.todos.write().await;
        match todos
            .iter_mut()
            .find(|todo| todo.id == id && todo.user_id == user_id)
        {
            Some(todo) => {
                todo.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_todo_complete(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_complete: bool,
    ) -> StoreResult<bool> {
        let mut todos = self.todos.write().await;
        match todos
            .iter_mut()
            .find(|todo| todo.id == id && todo.user_id == user_id)
        {
            Some(todo) => {
                todo.is_complete = is_complete;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|todo| !(todo.id == id && todo.user_id == user_id));
        Ok(todos.len() < before)
    }
}
