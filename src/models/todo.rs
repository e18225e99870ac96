use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::Schema;

/// A todo item as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub name: String,
    pub is_complete: bool,
    /// Owner of the todo. Every query and mutation is scoped by it.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new, incomplete todo owned by `user_id`.
    pub fn new(input: NewTodo, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            is_complete: false,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Parses a todo id received as a string. Anything that is not a UUID cannot
/// name a stored todo.
pub fn parse_todo_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddTodoInput {
    #[validate(
        required(message = "Name is required."),
        length(min = 1, message = "Name is required.")
    )]
    pub name: Option<String>,
}

/// Validated payload of the add action.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub name: String,
}

impl Schema for NewTodo {
    type Raw = AddTodoInput;
    const FIELDS: &'static [(&'static str, &'static str)] = &[("name", "name")];

    fn from_raw(raw: AddTodoInput) -> Self {
        Self {
            name: raw.name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTodoInput {
    #[validate(
        required(message = "Id is required."),
        length(min = 1, message = "Id is required.")
    )]
    pub id: Option<String>,
    #[validate(
        required(message = "Name is required."),
        length(min = 1, message = "Name is required.")
    )]
    pub name: Option<String>,
}

/// Validated payload of the update action.
#[derive(Debug, Clone)]
pub struct TodoRename {
    pub id: String,
    pub name: String,
}

impl Schema for TodoRename {
    type Raw = UpdateTodoInput;
    const FIELDS: &'static [(&'static str, &'static str)] = &[("id", "id"), ("name", "name")];

    fn from_raw(raw: UpdateTodoInput) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ToggleTodoInput {
    #[validate(
        required(message = "Id is required."),
        length(min = 1, message = "Id is required.")
    )]
    pub id: Option<String>,
    #[validate(required(message = "Completion state is required."))]
    pub is_complete: Option<bool>,
}

/// Validated payload of the toggle action.
#[derive(Debug, Clone)]
pub struct TodoToggle {
    pub id: String,
    pub is_complete: bool,
}

impl Schema for TodoToggle {
    type Raw = ToggleTodoInput;
    const FIELDS: &'static [(&'static str, &'static str)] =
        &[("id", "id"), ("is_complete", "isComplete")];

    fn from_raw(raw: ToggleTodoInput) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            is_complete: raw.is_complete.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteTodoInput {
    #[validate(
        required(message = "Id is required."),
        length(min = 1, message = "Id is required.")
    )]
    pub id: Option<String>,
}

/// Validated payload of the delete action.
#[derive(Debug, Clone)]
pub struct TodoRef {
    pub id: String,
}

impl Schema for TodoRef {
    type Raw = DeleteTodoInput;
    const FIELDS: &'static [(&'static str, &'static str)] = &[("id", "id")];

    fn from_raw(raw: DeleteTodoInput) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
        }
    }
}
