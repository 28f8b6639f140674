//! HTTP middleware implementations
//!
//! - Request ID tracking and request context
//! - API key authentication

mod auth;
mod helpers;
mod request_id;


pub use auth::{AuthMiddleware, AuthMiddlewareService, get_request_context};
pub use helpers::{check_credential, extract_credential, extract_user_agent};
pub use request_id::{REQUEST_ID_HEADER, RequestIdMiddleware, RequestIdMiddlewareService};
