//! Helper functions for middleware

use crate::config::AuthConfig;
use crate::utils::error::{GatewayError, Result};
use actix_web::http::header::HeaderMap;

/// Credential from the `Authorization` header, bare or as `Bearer <value>`.
/// Non-UTF-8 bytes are kept (lossily) so the header still counts as present.
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    let value = String::from_utf8_lossy(headers.get("authorization")?.as_bytes()).into_owned();
    if value.is_empty() {
        return None;
    }
    Some(
        value
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .unwrap_or(value),
    )
}

/// Check a presented credential against the configured secret
pub fn check_credential(config: &AuthConfig, credential: Option<&str>) -> Result<()> {
    if !config.key_required {
        return Ok(());
    }
    match credential {
        None => Err(GatewayError::missing_api_key()),
        Some(key) if key == config.api_key => Ok(()),
        Some(_) => Err(GatewayError::invalid_api_key()),
    }
}

/// User agent header as a string
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}
