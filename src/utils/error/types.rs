//! Error type definitions

use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway
///
/// Every failure a handler can produce is one of these variants. The HTTP
/// envelope for each variant is fixed in `response.rs`.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or malformed caller input
    #[error("{message}")]
    InvalidRequest {
        message: String,
        code: &'static str,
    },

    /// Missing or mismatched credential
    #[error("{message}")]
    Authentication {
        message: String,
        code: &'static str,
    },

    /// No route for the requested endpoint
    #[error("{0}")]
    NotFound(String),

    /// Gateway misconfiguration, detected at startup or before a tool runs
    #[error("Configuration error: {0}")]
    Config(String),

    /// Speech synthesis tool failure
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    /// Speech recognition tool failure
    #[error("Speech recognition failed: {0}")]
    Recognition(String),

    /// Speech translation tool failure
    #[error("Speech translation failed: {0}")]
    Translation(String),

    /// Image backend failure
    #[error("Image generation failed: {0}")]
    ImageGeneration(String),

    /// Upstream completion service unreachable or timed out
    #[error("Upstream request failed: {0}")]
    Proxy(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}
