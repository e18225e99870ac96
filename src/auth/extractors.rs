use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use super::identity::Identity;
use crate::error::AppError;

/// The caller's identity, as placed in the request extensions by `AuthGate`.
///
/// Handlers take this as an explicit argument instead of reading ambient
/// request state. Without the gate in front of the handler the extractor
/// fails with `AppError::Unauthorized`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Identity);

impl CurrentUser {
    pub fn user_id(&self) -> Uuid {
        self.0.user_id
    }

    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().copied() {
            Some(identity) => ready(Ok(CurrentUser(identity))),
            None => {
                let err = AppError::Unauthorized(
                    "No identity on request. Ensure AuthGate is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
