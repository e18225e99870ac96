use std::sync::Arc;

use crate::auth::{SessionManager, SessionSettings};
use crate::store::{TodoStore, UserStore};

/// Shared handles every worker gets through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoStore>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Builds the state over one store backing both users and todos.
    pub fn new<S>(store: Arc<S>, settings: SessionSettings) -> Self
    where
        S: TodoStore + UserStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        Self {
            todos: store,
            sessions: Arc::new(SessionManager::new(users, settings)),
        }
    }
}
