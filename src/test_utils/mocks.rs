//! Mock implementations
//!
//! `ScriptedSource` replays a fixed list of author-feed responses and records
//! the cursor sent with every call.

use super::fixtures::feed_page;
use crate::error::{Error, Result};
use crate::feed::{FeedSource, ProfileSummary};
use crate::types::JsonValue;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ScriptedSource {
    pages: Mutex<VecDeque<Result<JsonValue>>>,
    calls: Mutex<Vec<Option<String>>>,
    profile: Option<ProfileSummary>,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<JsonValue>) -> Self {
        Self::with_results(pages.into_iter().map(Ok).collect())
    }

    pub fn with_results(pages: Vec<Result<JsonValue>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: ProfileSummary) -> Self {
        self.profile = Some(profile);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Cursors sent so far, one per fetch
    pub fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FeedSource for ScriptedSource {
    async fn author_feed(&self, _actor: &str, cursor: Option<&str>) -> Result<JsonValue> {
        self.calls.lock().unwrap().push(cursor.map(str::to_string));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.pages.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(feed_page(vec![], None)))
    }

    async fn profile(&self, _actor: &str) -> Result<ProfileSummary> {
        self.profile
            .clone()
            .ok_or_else(|| Error::http_status(400, "Profile not found"))
    }
}
