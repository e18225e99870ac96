use crate::{
    auth::AuthError,
    models::{Credentials, Registration},
    response::ActionResult,
    state::AppState,
    validation::Validated,
};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use log::error;

pub const REGISTERED_MESSAGE: &str = "Registration successful.";
pub const REGISTER_FAILED_MESSAGE: &str = "Failed to register!";
pub const SIGNED_IN_MESSAGE: &str = "Signed in.";
pub const SIGN_IN_FAILED_MESSAGE: &str = "Failed to log in!";
pub const SIGNED_OUT_MESSAGE: &str = "Signed out.";

/// Domain failures are shown as-is; anything else is logged and replaced.
fn failure_message(action: &str, err: &AuthError, fallback: &str) -> String {
    if err.is_domain() {
        err.to_string()
    } else {
        error!("{} failed: {}", action, err);
        fallback.to_string()
    }
}

/// Register a new user
///
/// Creates the account and signs it in. The body reports the outcome; a
/// duplicate email is not an HTTP error.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    input: Validated<Registration>,
) -> impl Responder {
    match state.sessions.sign_up(&input.into_inner()).await {
        Ok(grant) => HttpResponse::Ok()
            .cookie(state.sessions.session_cookie(&grant))
            .json(ActionResult::ok(REGISTERED_MESSAGE)),
        Err(err) => HttpResponse::Ok().json(ActionResult::fail(failure_message(
            "registration",
            &err,
            REGISTER_FAILED_MESSAGE,
        ))),
    }
}

/// Login user
#[post("/login")]
pub async fn login(state: web::Data<AppState>, input: Validated<Credentials>) -> impl Responder {
    match state.sessions.sign_in(&input.into_inner()).await {
        Ok(grant) => HttpResponse::Ok()
            .cookie(state.sessions.session_cookie(&grant))
            .json(ActionResult::ok(SIGNED_IN_MESSAGE)),
        Err(err) => HttpResponse::Ok().json(ActionResult::fail(failure_message(
            "sign-in",
            &err,
            SIGN_IN_FAILED_MESSAGE,
        ))),
    }
}

/// Logout user
///
/// Ends the caller's session if there is one and clears the cookie either way.
#[post("/logout")]
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Some(identity) = state.sessions.resolve(req.headers()).await {
        if let Err(err) = state.sessions.sign_out(&identity).await {
            error!("sign-out failed: {}", err);
        }
    }

    HttpResponse::Ok()
        .cookie(state.sessions.removal_cookie())
        .json(ActionResult::ok(SIGNED_OUT_MESSAGE))
}
