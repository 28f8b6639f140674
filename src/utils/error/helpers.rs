//! Helper functions for creating specific error types

use super::types::GatewayError;

/// Helper functions for creating specific errors
impl GatewayError {
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            code: "invalid_request",
        }
    }

    pub fn invalid_request_with_code<S: Into<String>>(message: S, code: &'static str) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            code,
        }
    }

    /// A required request field was absent
    pub fn missing_parameter(name: &str) -> Self {
        Self::InvalidRequest {
            message: format!("Missing required parameter: {}", name),
            code: "missing_required_parameter",
        }
    }

    /// Request body above the configured limit
    pub fn payload_too_large(limit: usize) -> Self {
        Self::InvalidRequest {
            message: format!("Request body exceeds the {} byte limit", limit),
            code: "payload_too_large",
        }
    }

    pub fn missing_api_key() -> Self {
        Self::Authentication {
            message: "Missing authorization header".to_string(),
            code: "missing_api_key",
        }
    }

    pub fn invalid_api_key() -> Self {
        Self::Authentication {
            message: "Invalid API key".to_string(),
            code: "invalid_api_key",
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn synthesis<S: Into<String>>(message: S) -> Self {
        Self::Synthesis(message.into())
    }

    pub fn recognition<S: Into<String>>(message: S) -> Self {
        Self::Recognition(message.into())
    }

    pub fn translation<S: Into<String>>(message: S) -> Self {
        Self::Translation(message.into())
    }

    pub fn image_generation<S: Into<String>>(message: S) -> Self {
        Self::ImageGeneration(message.into())
    }

    pub fn upstream_unavailable<S: Into<String>>(message: S) -> Self {
        Self::Proxy(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}
