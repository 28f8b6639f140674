//! Request ID middleware
//!
//! Builds the [`RequestContext`] for every request and echoes its id back in
//! the `x-request-id` response header.

use crate::core::capabilities::resolve;
use crate::server::middleware::helpers::{extract_credential, extract_user_agent};
use crate::server::types::RequestContext;
use crate::utils::generate_request_id;
use actix_web::HttpMessage;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID middleware for Actix-web
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestIdMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddlewareService { service }))
    }
}

/// Service implementation for request ID middleware
pub struct RequestIdMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Percent-decoded path, the same one the router matches against
        let path = req.match_info().as_str().to_string();
        let context = RequestContext {
            request_id: generate_request_id(),
            method: req.method().to_string(),
            dispatch: resolve(&path),
            path,
            user_agent: extract_user_agent(req.headers()),
            credential: extract_credential(req.headers()),
        };
        let request_id = context.request_id.clone();

        debug!(
            request_id = %request_id,
            method = %context.method,
            path = %context.path,
            dispatch = context.dispatch.label(),
            "Processing request"
        );
        req.extensions_mut().insert(context);

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            Ok(res)
        })
    }
}
