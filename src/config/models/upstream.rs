//! Upstream completion service and outbound proxy configuration

use std::time::Duration;
use url::Url;

/// Upstream OpenAI-compatible completion service (LM Studio)
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Bearer credential injected on every forwarded request
    pub api_key: Option<String>,
    /// Connect and response timeout, in milliseconds
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:1234".to_string(),
            api_key: None,
            timeout_ms: 60_000,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate upstream configuration
    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid LMSTUDIO_BASE_URL '{}': {}", self.base_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "LMSTUDIO_BASE_URL must use http:// or https://, got {}",
                url.scheme()
            ));
        }
        if self.timeout_ms == 0 {
            return Err("Upstream timeout cannot be 0".to_string());
        }
        Ok(())
    }
}

/// Outbound network proxy for remote upstream targets
#[derive(Debug, Clone, Default)]
pub struct OutboundProxyConfig {
    pub enabled: bool,
    pub url: Option<String>,
}

impl OutboundProxyConfig {
    /// The proxy URL, if proxying is switched on and configured
    pub fn active_url(&self) -> Option<&str> {
        if self.enabled {
            self.url.as_deref().filter(|u| !u.is_empty())
        } else {
            None
        }
    }

    /// Validate proxy configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = self.active_url() {
            Url::parse(url).map_err(|e| format!("Invalid proxy URL '{}': {}", url, e))?;
        }
        Ok(())
    }
}
