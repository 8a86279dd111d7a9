//! Pagination types
//!
//! Session state, filter policy and the tagged outcomes returned by the
//! feed paginator.

use crate::error::Error;
use crate::feed::{FeedItem, FeedViewPost};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// Session
// ============================================================================

/// Cursor and dedup state for one feed load.
///
/// `seen` only grows until `reset`; a uri accepted once is never accepted again
/// in the same session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationSession {
    cursor: Option<String>,
    previous_cursor: Option<String>,
    seen: HashSet<String>,
    finished: bool,
}

impl PaginationSession {
    /// Create a fresh session positioned before the first page
    pub fn new() -> Self {
        Self::default()
    }

    /// Continuation token for the next request
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Token consumed by the last successful request
    pub fn previous_cursor(&self) -> Option<&str> {
        self.previous_cursor.as_deref()
    }

    /// Whether another page may exist
    pub fn has_more(&self) -> bool {
        !self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_seen(&self, uri: &str) -> bool {
        self.seen.contains(uri)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Clear cursor and dedup state for a full reload
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn mark_seen(&mut self, uri: String) {
        self.seen.insert(uri);
    }

    /// A returned token that repeats the one just sent (or the one before it)
    /// means the server is not advancing.
    pub(crate) fn is_stalled_by(&self, next: &str) -> bool {
        self.cursor.as_deref() == Some(next) || self.previous_cursor.as_deref() == Some(next)
    }

    /// Move to the next token; no token ends the stream
    pub(crate) fn advance(&mut self, next: Option<String>) {
        self.previous_cursor = self.cursor.take();
        self.finished = next.is_none();
        self.cursor = next;
    }

    /// End the stream, clearing the cursor
    pub(crate) fn finish(&mut self) {
        self.cursor = None;
        self.finished = true;
    }
}

// ============================================================================
// Filter policy
// ============================================================================

/// Why a raw entry was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Entry does not decode as a feed view
    Undecodable,
    /// No post identifier
    MissingUri,
    /// Identifier already accepted in this session
    AlreadySeen,
    /// Repost, excluded in author-only mode
    Repost,
    /// Reply, excluded in author-only mode
    Reply,
    /// Embed is neither an image set nor a video
    UnsupportedEmbed,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undecodable => "undecodable",
            Self::MissingUri => "missing_uri",
            Self::AlreadySeen => "already_seen",
            Self::Repost => "repost",
            Self::Reply => "reply",
            Self::UnsupportedEmbed => "unsupported_embed",
        }
    }
}

/// Which entries of the author feed make it into the gallery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPolicy {
    /// Keep only original posts by the subject (no reposts, no replies)
    pub author_only: bool,
}

impl FilterPolicy {
    pub fn new(author_only: bool) -> Self {
        Self { author_only }
    }

    /// Apply the filter rules in order: identity, authorship, media type
    pub fn check(
        &self,
        entry: &FeedViewPost,
        session: &PaginationSession,
    ) -> std::result::Result<(), Rejection> {
        let uri = entry.uri().ok_or(Rejection::MissingUri)?;
        if session.is_seen(uri) {
            return Err(Rejection::AlreadySeen);
        }

        if self.author_only {
            if entry.is_repost() {
                return Err(Rejection::Repost);
            }
            if entry.is_reply() {
                return Err(Rejection::Reply);
            }
        }

        if !entry.embed_kind().is_supported() {
            return Err(Rejection::UnsupportedEmbed);
        }

        Ok(())
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Why pagination failed. Every failure ends the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Network error or non-success status
    Transport(String),
    /// Body is not valid JSON
    Decode(String),
    /// Body is JSON but has no `feed` array
    Malformed(String),
    /// The server returned a continuation token it already returned
    Stalled { cursor: String },
    /// The fetch was cancelled by the caller
    Cancelled,
}

impl FailureReason {
    /// Classify a source error
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Decode { .. } | Error::JsonParse(_) => Self::Decode(err.to_string()),
            _ => Self::Transport(err.to_string()),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport failure: {message}"),
            Self::Decode(message) => write!(f, "decode failure: {message}"),
            Self::Malformed(message) => write!(f, "malformed response: {message}"),
            Self::Stalled { cursor } => write!(f, "cursor did not advance ({cursor})"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of fetching one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Items accepted from this page. May be empty while more pages exist.
    Accepted(Vec<FeedItem>),
    /// The stream had already ended; no request was made
    Exhausted,
    /// The fetch failed and the session has ended
    Failed(FailureReason),
}

impl PageOutcome {
    /// Accepted items, empty for terminal outcomes
    pub fn items(&self) -> &[FeedItem] {
        match self {
            Self::Accepted(items) => items,
            _ => &[],
        }
    }

    pub fn into_items(self) -> Vec<FeedItem> {
        match self {
            Self::Accepted(items) => items,
            _ => Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// When the initial accumulation gives up short of its target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationPolicy {
    /// Stop at the first page that yields no accepted items, even if the
    /// cursor is still present
    #[default]
    StopOnEmptyPage,
    /// Keep paging through sparse pages until the stream ends
    UntilExhausted,
}

/// Why accumulation stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The minimum count was reached
    Filled,
    /// A page yielded nothing and the policy says stop
    EmptyPage,
    /// The upstream has no more pages
    Exhausted,
    /// A fetch failed
    Failed(FailureReason),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filled => write!(f, "filled"),
            Self::EmptyPage => write!(f, "empty page"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Items collected by `FeedPaginator::accumulate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulation {
    pub items: Vec<FeedItem>,
    pub pages_fetched: usize,
    pub stop: StopReason,
}
