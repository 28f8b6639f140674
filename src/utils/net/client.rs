use crate::utils::error::{GatewayError, Result};
use reqwest::{Client, ClientBuilder, Proxy};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    /// Deadline for the whole exchange, body included. `None` leaves
    /// response timing to the caller.
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(60),
            timeout: Some(Duration::from_secs(60)),
            proxy: None,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

pub struct ClientUtils;

impl ClientUtils {
    /// Build a client. Without an explicit proxy, system proxies are ignored.
    pub fn create_http_client(config: &HttpClientConfig) -> Result<Client> {
        let mut client_builder = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = match &config.proxy {
            Some(proxy_url) => {
                let proxy = Proxy::all(proxy_url).map_err(|e| {
                    GatewayError::Config(format!("Invalid proxy configuration: {}", e))
                })?;
                client_builder.proxy(proxy)
            }
            None => client_builder.no_proxy(),
        };

        client_builder
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to build HTTP client: {}", e)))
    }
}
