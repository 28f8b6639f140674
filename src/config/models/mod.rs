//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

#![allow(missing_docs)]

pub mod artifacts;
pub mod auth;
pub mod images;
pub mod server;
pub mod speech;
pub mod transcription;
pub mod upstream;

pub use artifacts::*;
pub use auth::*;
pub use images::*;
pub use server::*;
pub use speech::*;
pub use transcription::*;
pub use upstream::*;

/// Default listen host
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    3000
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    50 * 1024 * 1024 // 50MB
}

/// Default timeout for one external tool invocation, in seconds
pub fn default_tool_timeout() -> u64 {
    300
}
