//! Network utilities: outbound HTTP clients and upstream target classification

pub mod client;
pub mod target;

pub use client::{ClientUtils, HttpClientConfig};
pub use target::{ProxyTarget, is_local_host, is_local_url};
