pub mod todo;
pub mod user;

pub use todo::{parse_todo_id, NewTodo, Todo, TodoRef, TodoRename, TodoToggle};
pub use user::{Credentials, Registration, User};
