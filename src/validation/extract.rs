use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use serde_json::Value;

use super::Schema;
use crate::error::AppError;

/// Extracts a JSON body and validates it against schema `T`.
///
/// Handlers that take `Validated<T>` never run with an invalid payload: a body
/// that is not JSON is rejected with `AppError::BadRequest`, and a body that
/// fails the schema with `AppError::Validation` carrying the full issue list.
#[derive(Debug)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for Validated<T>
where
    T: Schema + 'static,
{
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Json::<Value>::from_request(req, payload);
        let path = req.path().to_string();

        Box::pin(async move {
            let web::Json(value) = body.await.map_err(|e| {
                log::debug!("rejected unreadable body on {}: {}", path, e);
                AppError::BadRequest(format!("Invalid JSON payload: {}", e))
            })?;

            T::validate(value).map(Validated).map_err(|issues| {
                log::debug!("validation failed on {}: {} issue(s)", path, issues.len());
                AppError::Validation(issues).into()
            })
        })
    }
}
