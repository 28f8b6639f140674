//! Per-request types shared by middleware and handlers

use crate::core::capabilities::Dispatch;

/// Request metadata, built once by the request-id middleware and stored in
/// the request extensions
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// UUID v4
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub user_agent: Option<String>,
    /// Credential from the `Authorization` header, with any `Bearer ` prefix removed
    pub credential: Option<String>,
    pub dispatch: Dispatch,
}
