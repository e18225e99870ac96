use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Health check endpoint
///
/// Returns the current status of the API and timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now()
    }))
}

/// Landing page, and where `AuthGate` sends callers without a session.
#[get("/")]
pub async fn landing() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "links": {
            "register": "/auth/register",
            "login": "/auth/login",
            "todos": "/todos"
        }
    }))
}
