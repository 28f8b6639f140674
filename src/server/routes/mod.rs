//! HTTP route modules
//!
//! This module contains all HTTP route handlers organized by functionality.

pub mod ai;
pub mod health;

use crate::utils::error::GatewayError;
use actix_web::HttpRequest;

/// Fallback for every path no route claims
pub async fn not_found(req: HttpRequest) -> Result<actix_web::HttpResponse, GatewayError> {
    Err(GatewayError::not_found(format!(
        "Endpoint not found: {} {}",
        req.method(),
        req.uri()
    )))
}
