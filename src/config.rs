//! Gallery configuration
//!
//! All settings live in one YAML document. Every key is optional; a missing
//! file section falls back to the defaults below.
//!
//! ```yaml
//! handle: alice.bsky.social
//! author_only: true
//! initial_count: 12
//! accumulation: until_exhausted
//! http:
//!   timeout_secs: 10
//!   max_retries: 2
//! proxy:
//!   edge_cache_control: "public, max-age=300, stale-while-revalidate=600"
//! ```

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::{AccumulationPolicy, FilterPolicy};
use crate::types::{BackoffType, LogLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Public AppView serving unauthenticated reads
pub const DEFAULT_SERVICE_URL: &str = "https://api.bsky.app";

/// Public web client used for outbound links
pub const DEFAULT_WEB_URL: &str = "https://bsky.app";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete gallery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Subject handle, without the leading `@`
    pub handle: String,

    /// Only original posts by the subject (no reposts, no replies)
    pub author_only: bool,

    /// AppView base URL
    pub service_url: String,

    /// Web client base URL for profile, post and hashtag links
    pub web_url: String,

    /// Minimum accepted items in the initial set
    pub initial_count: usize,

    /// Optional `limit` sent with each page request
    pub page_limit: Option<u32>,

    /// How the initial set treats pages with no accepted items
    pub accumulation: AccumulationPolicy,

    /// Default log level when `RUST_LOG` is unset
    pub log_level: LogLevel,

    /// HTTP client settings for AppView calls
    pub http: HttpSettings,

    /// RSS edge proxy settings
    pub proxy: ProxySettings,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            handle: "bsky.app".to_string(),
            author_only: true,
            service_url: DEFAULT_SERVICE_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            initial_count: 9,
            page_limit: None,
            accumulation: AccumulationPolicy::default(),
            log_level: LogLevel::default(),
            http: HttpSettings::default(),
            proxy: ProxySettings::default(),
        }
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// Retry, backoff and rate limit settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff: BackoffType,
    pub requests_per_second: u32,
    pub burst: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 10_000,
            backoff: BackoffType::Exponential,
            requests_per_second: 5,
            burst: 5,
        }
    }
}

// ============================================================================
// Proxy Settings
// ============================================================================

/// RSS edge proxy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Upstream RSS resource; defaults to the subject's profile feed
    pub upstream: Option<String>,

    /// `Cache-Control` to set on proxied responses; upstream value kept if unset
    pub edge_cache_control: Option<String>,

    /// Upstream request timeout
    pub timeout_secs: u64,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            upstream: None,
            edge_cache_control: None,
            timeout_secs: 30,
        }
    }
}

// ============================================================================
// Loading and validation
// ============================================================================

/// Load a configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<GalleryConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    GalleryConfig::from_yaml_str(&content)
}

impl GalleryConfig {
    /// Parse, normalize and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Strip a leading `@` and surrounding whitespace from the handle
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.handle = self.handle.trim().trim_start_matches('@').to_string();
        self
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.handle.is_empty() {
            return Err(Error::missing_field("handle"));
        }
        if self.handle.chars().any(char::is_whitespace) {
            return Err(Error::invalid_value("handle", "must not contain whitespace"));
        }
        if self.initial_count == 0 {
            return Err(Error::invalid_value("initial_count", "must be at least 1"));
        }

        validate_url("service_url", &self.service_url)?;
        validate_url("web_url", &self.web_url)?;
        if let Some(upstream) = &self.proxy.upstream {
            validate_url("proxy.upstream", upstream)?;
        }

        Ok(())
    }

    pub fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy::new(self.author_only)
    }

    /// HTTP client configuration for AppView calls
    pub fn http_client_config(&self) -> HttpClientConfig {
        let http = &self.http;
        HttpClientConfig::builder()
            .base_url(&self.service_url)
            .timeout(Duration::from_secs(http.timeout_secs))
            .max_retries(http.max_retries)
            .backoff(
                http.backoff,
                Duration::from_millis(http.initial_backoff_ms),
                Duration::from_millis(http.max_backoff_ms),
            )
            .rate_limit(RateLimiterConfig::new(http.requests_per_second, http.burst))
            .build()
    }

    /// Upstream RSS resource for the edge proxy
    pub fn proxy_upstream(&self) -> String {
        self.proxy.upstream.clone().unwrap_or_else(|| {
            format!(
                "{}/profile/{}/rss",
                self.web_url.trim_end_matches('/'),
                self.handle
            )
        })
    }
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    let url = url::Url::parse(value).map_err(|e| Error::invalid_value(field, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_value(field, "must be an http(s) URL"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GalleryConfig::default();
        assert_eq!(config.handle, "bsky.app");
        assert!(config.author_only);
        assert_eq!(config.initial_count, 9);
        assert_eq!(config.accumulation, AccumulationPolicy::StopOnEmptyPage);
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_document() {
        let yaml = r#"
handle: "@alice.bsky.social"
author_only: false
initial_count: 12
page_limit: 50
accumulation: until_exhausted
log_level: debug
http:
  timeout_secs: 5
  max_retries: 1
  backoff: linear
proxy:
  edge_cache_control: "public, max-age=300"
"#;
        let config = GalleryConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.handle, "alice.bsky.social");
        assert!(!config.author_only);
        assert_eq!(config.initial_count, 12);
        assert_eq!(config.page_limit, Some(50));
        assert_eq!(config.accumulation, AccumulationPolicy::UntilExhausted);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.backoff, BackoffType::Linear);
        assert_eq!(config.http.requests_per_second, 5);
        assert_eq!(
            config.proxy.edge_cache_control.as_deref(),
            Some("public, max-age=300")
        );
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(
            GalleryConfig::from_yaml_str("  \n").unwrap(),
            GalleryConfig::default()
        );
    }

    #[test]
    fn test_validation_errors() {
        let err = GalleryConfig::from_yaml_str("handle: \"@\"").unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));

        let err = GalleryConfig::from_yaml_str("initial_count: 0").unwrap_err();
        assert!(err.to_string().contains("initial_count"));

        let err = GalleryConfig::from_yaml_str("service_url: ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("service_url"));

        let err = GalleryConfig::from_yaml_str("web_url: not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_bad_yaml() {
        let err = GalleryConfig::from_yaml_str("initial_count: [1, 2]").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_proxy_upstream() {
        let config = GalleryConfig::from_yaml_str("handle: alice.bsky.social").unwrap();
        assert_eq!(
            config.proxy_upstream(),
            "https://bsky.app/profile/alice.bsky.social/rss"
        );

        let config =
            GalleryConfig::from_yaml_str("proxy:\n  upstream: https://feeds.example/a.rss")
                .unwrap();
        assert_eq!(config.proxy_upstream(), "https://feeds.example/a.rss");
    }

    #[test]
    fn test_http_client_config() {
        let config = GalleryConfig::from_yaml_str("http:\n  max_retries: 7").unwrap();
        let http = config.http_client_config();
        assert_eq!(http.base_url.as_deref(), Some(DEFAULT_SERVICE_URL));
        assert_eq!(http.max_retries, 7);
        assert_eq!(http.timeout, Duration::from_secs(30));
        assert_eq!(http.rate_limit, Some(RateLimiterConfig::new(5, 5)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "handle: bob.test\ninitial_count: 3").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.handle, "bob.test");
        assert_eq!(config.initial_count, 3);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
