//! Pass-through forwarding of `/v1/*` traffic to the upstream completion service

use crate::config::{OutboundProxyConfig, UpstreamConfig};
use crate::utils::error::{GatewayError, Result};
use crate::utils::net::{ClientUtils, HttpClientConfig, ProxyTarget};
use async_stream::try_stream;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Headers that describe a single connection and never cross the proxy
const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Whether a header is dropped in either direction
pub fn is_stripped_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    HOP_BY_HOP_HEADERS.contains(&name.as_str()) || name == "host" || name == "content-length"
}

/// An inbound request, detached from the HTTP framework
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: String,
    /// Path plus query string, e.g. `/v1/chat/completions?x=1`
    pub path_and_query: String,
    pub headers: Vec<(String, Vec<u8>)>,
    pub body: Bytes,
}

/// Upstream reply ready to be relayed
pub struct ForwardedResponse {
    pub status: u16,
    pub headers: Vec<(String, Vec<u8>)>,
    pub body: BoxStream<'static, Result<Bytes>>,
}

impl std::fmt::Debug for ForwardedResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardedResponse")
            .field("status", &self.status)
            .field("headers", &self.headers.len())
            .finish()
    }
}

/// Relays requests to the upstream completion service
pub struct UpstreamForwarder {
    target: ProxyTarget,
    client: Client,
}

impl UpstreamForwarder {
    pub fn new(upstream: &UpstreamConfig, proxy: &OutboundProxyConfig) -> Result<Self> {
        let target = ProxyTarget::from_config(upstream)?;
        let outbound = target.outbound_proxy(proxy).map(str::to_string);

        info!(
            upstream = %target.base_url,
            local = target.is_local,
            via_proxy = outbound.is_some(),
            "Configured upstream completion service"
        );

        // Streams may outlive any fixed deadline; waits are bounded in `forward`
        let client = ClientUtils::create_http_client(&HttpClientConfig {
            connect_timeout: target.timeout,
            timeout: None,
            proxy: outbound,
            ..HttpClientConfig::default()
        })?;

        Ok(Self { target, client })
    }

    pub fn target(&self) -> &ProxyTarget {
        &self.target
    }

    /// Forward one request. Transport failures are never retried.
    pub async fn forward(
        &self,
        request: ForwardRequest,
        request_id: &str,
    ) -> Result<ForwardedResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            GatewayError::invalid_request(format!("Unsupported method: {}", request.method))
        })?;
        let url = self.target.url_for(&request.path_and_query);

        debug!(request_id = request_id, method = %method, url = %url, "Forwarding upstream");

        let mut builder = self.client.request(method, &url);
        for (name, value) in &request.headers {
            if is_stripped_header(name) {
                continue;
            }
            if self.target.bearer.is_some() && name.eq_ignore_ascii_case("authorization") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_slice());
        }
        if let Some(key) = &self.target.bearer {
            builder = builder.bearer_auth(key);
        }

        let timeout = self.target.timeout;
        let response = match tokio::time::timeout(timeout, builder.body(request.body).send()).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(request_id = request_id, url = %url, "Upstream request failed: {}", e);
                return Err(GatewayError::upstream_unavailable(e.to_string()));
            }
            Err(_) => {
                warn!(request_id = request_id, url = %url, "Upstream did not respond in time");
                return Err(GatewayError::upstream_unavailable(format!(
                    "No response from upstream within {}ms",
                    timeout.as_millis()
                )));
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_stripped_header(name.as_str()))
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect();

        let body = idle_limited(
            response.bytes_stream().map_err(GatewayError::HttpClient).boxed(),
            timeout,
            request_id.to_string(),
        )
        .boxed();

        Ok(ForwardedResponse {
            status,
            headers,
            body,
        })
    }
}

/// Relay `body`, failing once the upstream stays silent for longer than `idle`
fn idle_limited(
    body: BoxStream<'static, Result<Bytes>>,
    idle: Duration,
    request_id: String,
) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
    try_stream! {
        let mut body = body;
        loop {
            match tokio::time::timeout(idle, body.next()).await {
                Ok(Some(Ok(chunk))) => yield chunk,
                Ok(Some(Err(e))) => {
                    error!(request_id = %request_id, "Upstream stream interrupted: {}", e);
                    Err::<(), _>(e)?;
                }
                Ok(None) => break,
                Err(_) => {
                    error!(request_id = %request_id, "Upstream stream stalled");
                    Err::<(), _>(GatewayError::upstream_unavailable(format!(
                        "Upstream sent nothing for {}ms",
                        idle.as_millis()
                    )))?;
                }
            }
        }
    }
}
