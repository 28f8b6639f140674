//! Utility modules for the Gateway
//!
//! - **error**: the gateway error type and its HTTP envelope
//! - **net**: HTTP client construction and upstream target classification

pub mod error;
pub mod net;

pub use net::{ClientUtils, HttpClientConfig};

use uuid::Uuid;

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Truncate string to at most `max_chars` characters with ellipsis
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
