//! # mini-ai-gateway
//!
//! An OpenAI-compatible HTTP gateway over local machine capabilities.
//!
//! ## Features
//!
//! - **Speech synthesis**: `POST /v1/audio/speech` through system voices or voice cloning
//! - **Speech recognition**: `POST /v1/audio/transcriptions` and `/v1/audio/translations`
//! - **Image generation**: `POST /v1/images/generations` through Draw Things
//! - **Pass-through**: every other `/v1/*` request goes to an upstream completion service
//! - **Ephemeral artifacts**: generated files are deleted after they are served
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use mini_ai_gateway::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let gateway = Gateway::new(config)?;
//!     mini_ai_gateway::server::builder::run_server(gateway).await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::Gateway;
pub use utils::error::{GatewayError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        }
    }
}

/// Build
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
