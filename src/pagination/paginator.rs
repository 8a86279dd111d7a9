//! Cursor paginator over the author feed
//!
//! Pages are requested strictly one at a time: page N+1 is never requested
//! before page N has been filtered and deduplicated.

use super::types::{
    Accumulation, AccumulationPolicy, FailureReason, FilterPolicy, PageOutcome,
    PaginationSession, Rejection, StopReason,
};
use crate::feed::{FeedItem, FeedSource, FeedViewPost};
use crate::types::{JsonValue, OptionStringExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Fetches, filters and deduplicates author-feed pages
pub struct FeedPaginator {
    source: Arc<dyn FeedSource>,
    actor: String,
    policy: FilterPolicy,
    cancel: CancellationToken,
}

impl FeedPaginator {
    /// Create a paginator for `actor`
    pub fn new(source: Arc<dyn FeedSource>, actor: impl Into<String>, policy: FilterPolicy) -> Self {
        Self {
            source,
            actor: actor.into(),
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort in-flight and future fetches when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn policy(&self) -> FilterPolicy {
        self.policy
    }

    pub fn source(&self) -> &Arc<dyn FeedSource> {
        &self.source
    }

    /// Fetch the next page for `session`.
    ///
    /// Transport, decode and structural failures and stalls all end the
    /// session. Cancellation leaves the cursor untouched.
    pub async fn fetch_page(&self, session: &mut PaginationSession) -> PageOutcome {
        if session.is_finished() {
            return PageOutcome::Exhausted;
        }

        let cursor = session.cursor().map(str::to_string);
        let response = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                warn!(actor = %self.actor, "Feed fetch cancelled");
                return PageOutcome::Failed(FailureReason::Cancelled);
            }
            response = self.source.author_feed(&self.actor, cursor.as_deref()) => response,
        };

        match response {
            Ok(body) => self.process_page(&body, session),
            Err(e) => {
                error!(actor = %self.actor, "Feed fetch failed: {e}");
                session.finish();
                PageOutcome::Failed(FailureReason::from_error(&e))
            }
        }
    }

    /// Apply one raw `getAuthorFeed` body to the session
    pub fn process_page(&self, body: &JsonValue, session: &mut PaginationSession) -> PageOutcome {
        let Some(entries) = body.get("feed").and_then(JsonValue::as_array) else {
            warn!("Unexpected feed structure: {body}");
            session.finish();
            return PageOutcome::Failed(FailureReason::Malformed(
                "missing or non-array `feed` field".to_string(),
            ));
        };

        let next = body
            .get("cursor")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .none_if_empty();

        if let Some(next) = &next {
            if session.is_stalled_by(next) {
                warn!(cursor = %next, "Pagination cursor did not advance, stopping");
                session.finish();
                return PageOutcome::Failed(FailureReason::Stalled {
                    cursor: next.clone(),
                });
            }
        }
        session.advance(next);

        let accepted = self.filter_entries(entries, session);
        debug!(
            raw = entries.len(),
            accepted = accepted.len(),
            more = session.has_more(),
            "Processed feed page"
        );
        PageOutcome::Accepted(accepted)
    }

    fn filter_entries(&self, entries: &[JsonValue], session: &mut PaginationSession) -> Vec<FeedItem> {
        let mut accepted = Vec::new();

        for raw in entries {
            let entry: FeedViewPost = match serde_json::from_value(raw.clone()) {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(reason = Rejection::Undecodable.as_str(), "Entry rejected: {e}");
                    continue;
                }
            };

            if let Err(rejection) = self.policy.check(&entry, session) {
                debug!(uri = ?entry.uri(), reason = rejection.as_str(), "Entry rejected");
                continue;
            }

            if let Some(item) = entry.into_item() {
                session.mark_seen(item.uri.clone());
                accepted.push(item);
            }
        }

        accepted
    }

    /// Fetch pages until at least `min_count` items are accepted or the
    /// stream stops.
    pub async fn accumulate(
        &self,
        session: &mut PaginationSession,
        min_count: usize,
        policy: AccumulationPolicy,
    ) -> Accumulation {
        let mut items = Vec::new();
        let mut pages_fetched = 0;

        let stop = loop {
            if items.len() >= min_count {
                break StopReason::Filled;
            }
            if !session.has_more() {
                break StopReason::Exhausted;
            }

            let outcome = self.fetch_page(session).await;
            pages_fetched += 1;

            match outcome {
                PageOutcome::Accepted(page) => {
                    let empty = page.is_empty();
                    items.extend(page);
                    if empty
                        && session.has_more()
                        && policy == AccumulationPolicy::StopOnEmptyPage
                    {
                        break StopReason::EmptyPage;
                    }
                }
                PageOutcome::Exhausted => break StopReason::Exhausted,
                PageOutcome::Failed(reason) => break StopReason::Failed(reason),
            }
        };

        debug!(
            items = items.len(),
            pages_fetched,
            stop = ?stop,
            "Accumulation finished"
        );

        Accumulation {
            items,
            pages_fetched,
            stop,
        }
    }
}

impl std::fmt::Debug for FeedPaginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedPaginator")
            .field("actor", &self.actor)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
