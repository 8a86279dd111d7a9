//! RSS edge proxy
//!
//! A stateless passthrough in front of one fixed upstream RSS resource.
//! Conditional request headers are forwarded so the upstream can answer
//! `304 Not Modified`; everything else about caching is left to whatever
//! sits in front of this service.

mod server;

pub use server::{passthrough, router, serve};

use crate::config::{GalleryConfig, ProxySettings};
use crate::error::{Error, Result};
use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use std::time::Duration;
use tracing::debug;

/// Content type set on every proxied feed
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

/// Request headers passed on to the upstream
const FORWARDED_HEADERS: [&str; 3] = ["if-none-match", "if-modified-since", "cache-control"];

/// Response headers that only apply to a single connection
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Passthrough for a fixed upstream RSS resource
#[derive(Debug, Clone)]
pub struct RssProxy {
    client: reqwest::Client,
    upstream: String,
    edge_cache_control: Option<HeaderValue>,
}

impl RssProxy {
    /// Create a proxy for `upstream`
    pub fn new(upstream: impl Into<String>, settings: &ProxySettings) -> Result<Self> {
        let upstream = upstream.into();
        url::Url::parse(&upstream)?;

        let edge_cache_control = settings
            .edge_cache_control
            .as_deref()
            .map(|value| {
                HeaderValue::from_str(value).map_err(|e| {
                    Error::invalid_value("proxy.edge_cache_control", e.to_string())
                })
            })
            .transpose()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(format!("skyfolio/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            upstream,
            edge_cache_control,
        })
    }

    /// Proxy for the configured subject's feed
    pub fn from_config(config: &GalleryConfig) -> Result<Self> {
        Self::new(config.proxy_upstream(), &config.proxy)
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Fetch the upstream feed on behalf of a client request.
    ///
    /// Only transport failures are errors; any upstream status is passed
    /// through.
    pub async fn forward(&self, headers: &HeaderMap) -> Result<Response> {
        let mut request = self.client.get(&self.upstream);
        for name in FORWARDED_HEADERS {
            if let Some(value) = headers.get(name) {
                request = request.header(name, value.clone());
            }
        }

        let upstream = request
            .send()
            .await
            .map_err(|e| Error::proxy(format!("Upstream request failed: {e}")))?;
        let status = upstream.status();
        debug!(upstream = %self.upstream, status = status.as_u16(), "Upstream responded");

        if status == StatusCode::NOT_MODIFIED {
            return Ok(not_modified());
        }

        let mut response = Response::builder().status(status);
        if let Some(response_headers) = response.headers_mut() {
            for (name, value) in upstream.headers() {
                if !is_hop_by_hop(name) {
                    response_headers.append(name.clone(), value.clone());
                }
            }
            response_headers.insert(CONTENT_TYPE, HeaderValue::from_static(RSS_CONTENT_TYPE));
            if let Some(cache_control) = &self.edge_cache_control {
                response_headers.insert(CACHE_CONTROL, cache_control.clone());
            }
        }

        response
            .body(Body::from_stream(upstream.bytes_stream()))
            .map_err(|e| Error::proxy(format!("Failed to build response: {e}")))
    }
}

fn not_modified() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_MODIFIED;
    response
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

#[cfg(test)]
mod tests;
