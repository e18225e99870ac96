#![doc = "The `todoforge` library crate."]
#![doc = ""]
#![doc = "Domain models and their input schemas, session-based authentication, the"]
#![doc = "authorization gate, todo and auth handlers, persistence, and error handling"]
#![doc = "for the todoforge service. `main.rs` wires these into an `HttpServer`; the"]
#![doc = "integration tests mount the same routes over `store::MemoryStore`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

pub use crate::error::AppError;
pub use crate::state::AppState;
