use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;

use crate::error::AppError;
use crate::response::redirect_to;
use crate::state::AppState;

/// Requires a live session for everything it wraps.
///
/// Requests without one are answered with `303 See Other` to the landing page
/// before the wrapped handler or its extractors run. Otherwise the resolved
/// `Identity` is stored in the request extensions for `CurrentUser`.
pub struct AuthGate {
    landing: String,
}

impl AuthGate {
    pub fn new(landing: impl Into<String>) -> Self {
        Self {
            landing: landing.into(),
        }
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new("/")
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service: Rc::new(service),
            landing: self.landing.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    landing: String,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let landing = self.landing.clone();

        Box::pin(async move {
            let sessions = match req.app_data::<web::Data<AppState>>() {
                Some(state) => state.sessions.clone(),
                None => {
                    return Err(AppError::InternalServerError(
                        "AuthGate mounted without AppState".into(),
                    )
                    .into())
                }
            };

            match sessions.resolve(req.headers()).await {
                Some(identity) => {
                    req.extensions_mut().insert(identity);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                None => {
                    debug!("no session for {} {}, redirecting", req.method(), req.path());
                    let (request, _payload) = req.into_parts();
                    let response = redirect_to(&landing).map_into_right_body();
                    Ok(ServiceResponse::new(request, response))
                }
            }
        })
    }
}
