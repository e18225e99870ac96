use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{parse_todo_id, NewTodo, Todo, TodoRef, TodoRename, TodoToggle},
    response::{redirect_to, ActionResult},
    state::AppState,
    validation::Validated,
};
use actix_web::{get, post, web, HttpResponse};
use log::{debug, info};
use uuid::Uuid;

pub const TODOS_PATH: &str = "/todos";

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Todo {} not found", id))
}

/// An id that is not a UUID cannot name a stored todo.
fn owned_id(id: &str) -> Result<Uuid, AppError> {
    parse_todo_id(id).ok_or_else(|| not_found(id))
}

/// Lists the caller's todos, oldest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Todo` objects.
/// - `303 See Other`: no session (from `AuthGate`).
#[get("")]
pub async fn list_todos(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let todos = state.todos.list_todos(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(todos))
}

/// Fetches one of the caller's todos, e.g. to prefill an edit form.
#[get("/{id}")]
pub async fn get_todo(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let todo = state
        .todos
        .find_todo(user.user_id(), owned_id(&id)?)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Creates a todo owned by the caller and redirects to the list.
///
/// ## Request Body:
/// - `name`: non-empty string.
///
/// ## Responses:
/// - `303 See Other` to `/todos`.
/// - `422 Unprocessable Entity`: validation issues.
#[post("/add")]
pub async fn add_todo(
    state: web::Data<AppState>,
    user: CurrentUser,
    input: Validated<NewTodo>,
) -> Result<HttpResponse, AppError> {
    let todo = Todo::new(input.into_inner(), user.user_id());
    state.todos.insert_todo(&todo).await?;
    info!("user {} added todo {}", todo.user_id, todo.id);
    Ok(redirect_to(TODOS_PATH))
}

/// Renames one of the caller's todos and redirects to the list.
#[post("/update")]
pub async fn update_todo(
    state: web::Data<AppState>,
    user: CurrentUser,
    input: Validated<TodoRename>,
) -> Result<HttpResponse, AppError> {
    let TodoRename { id, name } = input.into_inner();
    if !state
        .todos
        .rename_todo(user.user_id(), owned_id(&id)?, &name)
        .await?
    {
        return Err(not_found(&id));
    }
    Ok(redirect_to(TODOS_PATH))
}

/// Sets the completion state of one of the caller's todos.
///
/// ## Responses:
/// - `204 No Content` on success.
/// - `404 Not Found`: no such todo owned by the caller.
#[post("/toggle")]
pub async fn toggle_todo(
    state: web::Data<AppState>,
    user: CurrentUser,
    input: Validated<TodoToggle>,
) -> Result<HttpResponse, AppError> {
    let TodoToggle { id, is_complete } = input.into_inner();
    if !state
        .todos
        .set_todo_complete(user.user_id(), owned_id(&id)?, is_complete)
        .await?
    {
        return Err(not_found(&id));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// Deletes one of the caller's todos. Reports whether a row was removed.
#[post("/delete")]
pub async fn delete_todo(
    state: web::Data<AppState>,
    user: CurrentUser,
    input: Validated<TodoRef>,
) -> Result<HttpResponse, AppError> {
    let TodoRef { id } = input.into_inner();
    let deleted = match parse_todo_id(&id) {
        Some(todo_id) => state.todos.delete_todo(user.user_id(), todo_id).await?,
        None => false,
    };
    if !deleted {
        debug!("user {} deleted nothing for id {}", user.user_id(), id);
    }
    Ok(HttpResponse::Ok().json(ActionResult::status(deleted)))
}
