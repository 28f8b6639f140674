//! Authentication middleware
//!
//! Protected requests without a valid credential are answered here and never
//! reach a handler.

use crate::server::AppState;
use crate::server::middleware::helpers::check_credential;
use crate::server::types::RequestContext;
use crate::utils::error::GatewayError;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{HttpMessage, HttpRequest, ResponseError, web};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// Auth middleware for Actix-web
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

/// Service implementation for auth middleware
pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let context = req.extensions().get::<RequestContext>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        let verdict = match (&context, &state) {
            (Some(context), Some(state)) if context.dispatch.requires_auth() => {
                check_credential(&state.config().auth, context.credential.as_deref())
            }
            (Some(_), Some(_)) => Ok(()),
            _ => Err(GatewayError::internal("Request context not initialised")),
        };

        if let Err(err) = verdict {
            if let Some(context) = &context {
                warn!(
                    request_id = %context.request_id,
                    path = %context.path,
                    "Rejected request: {}",
                    err
                );
            }
            let response = err.error_response();
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        if let Some(context) = &context {
            debug!(request_id = %context.request_id, "Request authorised");
        }

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}

/// Extract request context from request
pub fn get_request_context(req: &HttpRequest) -> Result<RequestContext, GatewayError> {
    req.extensions()
        .get::<RequestContext>()
        .cloned()
        .ok_or_else(|| GatewayError::internal("Missing request context"))
}
