//! Configuration management for the Gateway
//!
//! Configuration comes from environment variables (a `.env` file is loaded
//! first by the binary). Every setting has a default, so an empty
//! environment yields a working local setup.

pub mod loader;
pub mod models;

pub use models::*;

use crate::utils::error::{GatewayError, Result};
use tracing::{debug, info, warn};

/// Main configuration struct for the Gateway
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub speech: SpeechConfig,
    pub transcription: TranscriptionConfig,
    pub upstream: UpstreamConfig,
    pub outbound_proxy: OutboundProxyConfig,
    pub images: ImageBackendConfig,
    pub artifacts: ArtifactConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = loader::EnvSource::new(lookup).load()?;
        config.validate()?;
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Get auth configuration
    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.server
            .validate()
            .map_err(|e| GatewayError::Config(format!("Server config error: {}", e)))?;
        self.auth
            .validate()
            .map_err(|e| GatewayError::Config(format!("Auth config error: {}", e)))?;
        self.speech
            .validate()
            .map_err(|e| GatewayError::Config(format!("Speech config error: {}", e)))?;
        self.transcription
            .validate()
            .map_err(|e| GatewayError::Config(format!("Transcription config error: {}", e)))?;
        self.upstream
            .validate()
            .map_err(|e| GatewayError::Config(format!("Upstream config error: {}", e)))?;
        self.outbound_proxy
            .validate()
            .map_err(|e| GatewayError::Config(format!("Proxy config error: {}", e)))?;
        self.images
            .validate()
            .map_err(|e| GatewayError::Config(format!("Image backend config error: {}", e)))?;
        self.artifacts
            .validate()
            .map_err(|e| GatewayError::Config(format!("Artifact config error: {}", e)))?;

        crate::config::models::auth::warn_insecure_config(&self.auth);

        let clone = &self.speech.clone;
        if clone.enabled && (clone.ref_audio.is_none() || clone.ref_text.is_none()) {
            warn!(
                "Voice cloning is enabled without TTS_CLONE_REF_AUDIO and TTS_CLONE_REF_TEXT; clone requests will fail"
            );
        }

        debug!("Configuration validation completed");
        Ok(())
    }
}
