#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::test;
use serde_json::{json, Value};
use todoforge::auth::{SessionSettings, SESSION_COOKIE};
use todoforge::state::AppState;
use todoforge::store::MemoryStore;

pub const PASSWORD: &str = "password123";

/// App state over a fresh in-memory store, with cheap bcrypt.
pub fn memory_state() -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let settings = SessionSettings::new("integration-test-secret").with_bcrypt_cost(4);
    let state = AppState::new(store.clone(), settings);
    (store, state)
}

/// Initialises the full route configuration over `$state`.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(actix_web::middleware::Logger::default())
                .configure(todoforge::routes::config),
        )
        .await
    };
}

/// Pulls the session token out of a response's `Set-Cookie`.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

pub fn with_session(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.cookie(Cookie::new(SESSION_COOKIE, token.to_string()))
}

pub fn location<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Registers `email` and returns its session token.
pub async fn register_user<S, B>(app: &S, email: &str) -> Result<String, String>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    if !resp.status().is_success() {
        return Err(format!("Failed to register {}. Status: {}", email, resp.status()));
    }

    let token = session_cookie(&resp);
    let body: Value = test::read_body_json(resp).await;
    if body["success"] != json!(true) {
        return Err(format!("Registration of {} rejected: {}", email, body));
    }
    token.ok_or_else(|| format!("No session cookie set for {}", email))
}

/// Adds a todo as the session owner and returns the caller's list afterwards.
pub async fn add_todo<S, B>(app: &S, token: &str, name: &str) -> Vec<Value>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_session(test::TestRequest::post().uri("/todos/add"), token)
        .set_json(json!({ "name": name }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::SEE_OTHER);
    list_todos(app, token).await
}

pub async fn list_todos<S, B>(app: &S, token: &str) -> Vec<Value>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_session(test::TestRequest::get().uri("/todos"), token).to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    test::read_body_json(resp).await
}
