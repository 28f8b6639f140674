//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::Gateway;

/// HTTP server state shared across handlers
///
/// Every service lives behind an `Arc` inside [`Gateway`], so cloning the
/// state per worker is cheap.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        self.gateway.config()
    }
}
