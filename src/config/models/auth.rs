//! Authentication configuration

use tracing::warn;

/// Placeholder key shipped in sample environment files
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Require a credential on `/v1/*`
    pub key_required: bool,
    /// The shared secret callers must present
    pub api_key: String,
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.key_required && self.api_key.is_empty() {
            return Err("API_KEY must be set when API_KEY_REQUIRED is true".to_string());
        }
        Ok(())
    }
}

/// Warn about insecure configurations
pub fn warn_insecure_config(config: &AuthConfig) {
    if !config.key_required {
        warn!("API key authentication is disabled; every /v1 endpoint is open");
    } else if config.api_key == PLACEHOLDER_API_KEY {
        warn!("API_KEY still uses the sample placeholder value");
    }
}
