//! Image generation backend configuration

use std::time::Duration;
use url::Url;

/// Draw Things HTTP backend
#[derive(Debug, Clone)]
pub struct ImageBackendConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Response timeout, in milliseconds
    pub timeout_ms: u64,
}

impl Default for ImageBackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://127.0.0.1:7860".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl ImageBackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.enabled {
            Url::parse(&self.base_url).map_err(|e| {
                format!("Invalid DRAW_THINGS_BASE_URL '{}': {}", self.base_url, e)
            })?;
        }
        Ok(())
    }
}
