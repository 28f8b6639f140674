//! HTTP response handling for errors

use super::types::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

/// Standard error response format: `{"error": {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub code: &'static str,
}

/// A fully resolved error: body plus status
#[derive(Debug, Clone)]
pub struct ErrorEnvelope {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl GatewayError {
    /// Map this error onto the uniform envelope
    pub fn envelope(&self) -> ErrorEnvelope {
        let (status, error_type, code, message) = match self {
            GatewayError::InvalidRequest { message, code } => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                *code,
                message.clone(),
            ),
            GatewayError::Authentication { message, code } => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                *code,
                message.clone(),
            ),
            GatewayError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                "not_found_error",
                "endpoint_not_found",
                message.clone(),
            ),
            GatewayError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "configuration_error",
                self.to_string(),
            ),
            GatewayError::Synthesis(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "synthesis_error",
                "tts_error",
                self.to_string(),
            ),
            GatewayError::Recognition(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "recognition_error",
                "stt_error",
                self.to_string(),
            ),
            GatewayError::Translation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "translation_error",
                "translation_error",
                self.to_string(),
            ),
            GatewayError::ImageGeneration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "image_generation_error",
                "image_generation_failed",
                self.to_string(),
            ),
            GatewayError::Proxy(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "proxy_error",
                "upstream_unavailable",
                "Upstream completion service request failed".to_string(),
            ),
            GatewayError::Io(_)
            | GatewayError::Serialization(_)
            | GatewayError::HttpClient(_)
            | GatewayError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        ErrorEnvelope {
            status,
            body: ErrorResponse {
                error: ErrorDetail {
                    message,
                    error_type,
                    code,
                },
            },
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        self.envelope().status
    }

    fn error_response(&self) -> HttpResponse {
        let envelope = self.envelope();
        if envelope.status.is_server_error() {
            error!(code = envelope.body.error.code, "{}", self);
        }
        HttpResponse::build(envelope.status).json(envelope.body)
    }
}
