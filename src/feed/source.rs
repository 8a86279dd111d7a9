//! Upstream feed sources
//!
//! `FeedSource` is the seam between pagination and transport. `XrpcClient` is
//! the AppView implementation; tests script their own.

use super::types::ProfileSummary;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::types::JsonValue;
use async_trait::async_trait;
use tracing::{debug, error};

const AUTHOR_FEED_PATH: &str = "/xrpc/app.bsky.feed.getAuthorFeed";
const PROFILE_PATH: &str = "/xrpc/app.bsky.actor.getProfile";

/// Source of raw author-feed pages and profile snapshots
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one raw `getAuthorFeed` response body
    async fn author_feed(&self, actor: &str, cursor: Option<&str>) -> Result<JsonValue>;

    /// Fetch the actor's profile
    async fn profile(&self, actor: &str) -> Result<ProfileSummary>;
}

/// AppView client speaking XRPC over `HttpClient`
#[derive(Debug)]
pub struct XrpcClient {
    http: HttpClient,
    page_limit: Option<u32>,
}

impl XrpcClient {
    /// Create a client. The `HttpClient` must carry the AppView base URL.
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            page_limit: None,
        }
    }

    /// Request pages of at most `limit` entries
    #[must_use]
    pub fn with_page_limit(mut self, limit: Option<u32>) -> Self {
        self.page_limit = limit;
        self
    }
}

#[async_trait]
impl FeedSource for XrpcClient {
    async fn author_feed(&self, actor: &str, cursor: Option<&str>) -> Result<JsonValue> {
        debug!(actor, cursor = ?cursor, "Fetching author feed page");
        let request = RequestConfig::new()
            .query("actor", actor)
            .query_opt("cursor", cursor)
            .query_opt("limit", self.page_limit.map(|l| l.to_string()));
        self.http.get_json_with_config(AUTHOR_FEED_PATH, request).await
    }

    async fn profile(&self, actor: &str) -> Result<ProfileSummary> {
        debug!(actor, "Fetching profile");
        let request = RequestConfig::new().query("actor", actor);
        self.http.get_json_with_config(PROFILE_PATH, request).await
    }
}

/// Fetch a profile, logging failures. `None` is the unavailable marker.
pub async fn fetch_profile(source: &dyn FeedSource, actor: &str) -> Option<ProfileSummary> {
    match source.profile(actor).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            error!(actor, "Failed to fetch profile: {e}");
            None
        }
    }
}
