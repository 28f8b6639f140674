//! Upstream target classification

use crate::config::{OutboundProxyConfig, UpstreamConfig};
use crate::utils::error::{GatewayError, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use url::{Host, Url};

/// Where proxied `/v1/*` traffic goes
#[derive(Debug, Clone)]
pub struct ProxyTarget {
    pub base_url: Url,
    pub timeout: Duration,
    /// Credential injected as `Authorization: Bearer <key>`
    pub bearer: Option<String>,
    /// Local targets never go through an outbound proxy
    pub is_local: bool,
}

impl ProxyTarget {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            GatewayError::Config(format!("Invalid upstream URL '{}': {}", config.base_url, e))
        })?;
        let is_local = is_local_url(&base_url);

        Ok(Self {
            base_url,
            timeout: config.timeout(),
            bearer: config.api_key.clone().filter(|k| !k.is_empty()),
            is_local,
        })
    }

    /// The outbound proxy to use for this target, if any
    pub fn outbound_proxy<'a>(&self, proxy: &'a OutboundProxyConfig) -> Option<&'a str> {
        if self.is_local {
            None
        } else {
            proxy.active_url()
        }
    }

    /// Join an inbound path and query onto the base URL
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path_and_query
        )
    }
}

/// Whether the URL's host is on this machine or a private network
pub fn is_local_url(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => is_local_domain(domain),
        Some(Host::Ipv4(ip)) => is_local_ipv4(&ip),
        Some(Host::Ipv6(ip)) => is_local_ipv6(&ip),
        None => false,
    }
}

/// Classify a bare hostname or IP literal
pub fn is_local_host(host: &str) -> bool {
    let trimmed = host.trim_start_matches('[').trim_end_matches(']');
    match trimmed.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => is_local_ipv4(&ip),
        Ok(IpAddr::V6(ip)) => is_local_ipv6(&ip),
        Err(_) => is_local_domain(trimmed),
    }
}

fn is_local_domain(domain: &str) -> bool {
    domain.eq_ignore_ascii_case("localhost")
}

fn is_local_ipv4(ip: &Ipv4Addr) -> bool {
    // 127.0.0.0/8, 0.0.0.0, 10/8, 172.16/12, 192.168/16
    ip.is_loopback() || ip.is_unspecified() || ip.is_private()
}

fn is_local_ipv6(ip: &Ipv6Addr) -> bool {
    ip.is_loopback()
        // Unique local (fc00::/7)
        || (ip.segments()[0] & 0xfe00) == 0xfc00
        || ip.to_ipv4_mapped().is_some_and(|v4| is_local_ipv4(&v4))
}
