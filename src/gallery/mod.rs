//! Gallery module
//!
//! Drives the load sequence of one gallery: profile, initial set, then one
//! page per scroll request.
//!
//! # Overview
//!
//! `Gallery` owns the single `PaginationSession` and the advisory in-flight
//! guard. `load_more` answers `LoadMore::Busy` while another load holds the
//! session, so two scroll events arriving faster than the network never issue
//! overlapping fetches and a busy gallery is never mistaken for an exhausted
//! one.

use crate::config::GalleryConfig;
use crate::error::Result;
use crate::feed::{fetch_profile, FeedItem, FeedSource, ProfileSummary};
use crate::pagination::{
    AccumulationPolicy, FailureReason, FeedPaginator, PageOutcome, PaginationSession, StopReason,
};
use crate::render::{RenderMode, RenderSink};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Items produced by one load, ready for a render sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUpdate {
    pub items: Vec<FeedItem>,
    pub mode: RenderMode,
    /// Whether another page may exist
    pub has_more: bool,
    pub stop: StopReason,
}

impl FeedUpdate {
    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.stop {
            StopReason::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Draw this update. A failed load that produced no items is reported as
    /// a failure instead of an empty feed.
    pub fn render_into(&self, sink: &mut dyn RenderSink) -> Result<()> {
        match self.failure() {
            Some(reason) if self.items.is_empty() => sink.render_failure(reason),
            _ => sink.render_feed(&self.items, self.mode),
        }
    }
}

/// Result of a scroll-driven `load_more`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMore {
    /// One more page was fetched
    Loaded(FeedUpdate),
    /// Another load holds the session; try again later
    Busy,
    /// The stream has ended; no request was made
    Exhausted,
}

impl LoadMore {
    pub fn into_update(self) -> Option<FeedUpdate> {
        match self {
            Self::Loaded(update) => Some(update),
            Self::Busy | Self::Exhausted => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Locked session plus the in-flight flag.
///
/// The flag is raised after the lock is taken and cleared before the lock is
/// released, so `is_loading` never reports a load that does not hold the
/// session.
struct LoadGuard<'a> {
    session: MutexGuard<'a, PaginationSession>,
    flag: &'a AtomicBool,
}

impl<'a> LoadGuard<'a> {
    fn new(session: MutexGuard<'a, PaginationSession>, flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self { session, flag }
    }
}

impl Deref for LoadGuard<'_> {
    type Target = PaginationSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl DerefMut for LoadGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        // runs before the session field is dropped and unlocked
        self.flag.store(false, Ordering::Release);
    }
}

/// Loader for one subject's media gallery
pub struct Gallery {
    paginator: FeedPaginator,
    session: Mutex<PaginationSession>,
    loading: AtomicBool,
    initial_count: usize,
    accumulation: AccumulationPolicy,
}

impl Gallery {
    pub fn new(source: Arc<dyn FeedSource>, config: &GalleryConfig) -> Self {
        let paginator = FeedPaginator::new(source, &config.handle, config.filter_policy());
        Self {
            paginator,
            session: Mutex::new(PaginationSession::new()),
            loading: AtomicBool::new(false),
            initial_count: config.initial_count,
            accumulation: config.accumulation,
        }
    }

    /// Abort in-flight and future page fetches when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.paginator = self.paginator.with_cancellation(token);
        self
    }

    pub fn handle(&self) -> &str {
        self.paginator.actor()
    }

    /// Whether a load currently holds the session. Advisory only; use the
    /// `LoadMore` result to decide how to answer a scroll request.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn has_more(&self) -> bool {
        self.session.lock().await.has_more()
    }

    pub async fn session(&self) -> PaginationSession {
        self.session.lock().await.clone()
    }

    /// Fetch the profile summary; `None` if unavailable
    pub async fn load_profile(&self) -> Option<ProfileSummary> {
        fetch_profile(self.paginator.source().as_ref(), self.paginator.actor()).await
    }

    /// Accumulate the initial set from the current session position
    pub async fn load_initial(&self) -> FeedUpdate {
        let mut session = LoadGuard::new(self.session.lock().await, &self.loading);
        self.accumulate(&mut session).await
    }

    /// Fetch one more page, unless another load holds the session or the
    /// stream has ended
    pub async fn load_more(&self) -> LoadMore {
        let Ok(session) = self.session.try_lock() else {
            debug!(handle = self.handle(), "Load already in flight, skipping");
            return LoadMore::Busy;
        };
        let mut session = LoadGuard::new(session, &self.loading);
        if !session.has_more() {
            return LoadMore::Exhausted;
        }

        let outcome = self.paginator.fetch_page(&mut session).await;
        let has_more = session.has_more();
        let (items, stop) = match outcome {
            PageOutcome::Accepted(items) => {
                let stop = if has_more {
                    StopReason::Filled
                } else {
                    StopReason::Exhausted
                };
                (items, stop)
            }
            PageOutcome::Exhausted => (Vec::new(), StopReason::Exhausted),
            PageOutcome::Failed(reason) => (Vec::new(), StopReason::Failed(reason)),
        };

        debug!(items = items.len(), has_more, "Loaded next page");
        LoadMore::Loaded(FeedUpdate {
            items,
            mode: RenderMode::Append,
            has_more,
            stop,
        })
    }

    /// Reset cursor and dedup state, then load the initial set again
    pub async fn reload(&self) -> FeedUpdate {
        let mut session = LoadGuard::new(self.session.lock().await, &self.loading);
        session.reset();
        info!(handle = self.handle(), "Reloading gallery");
        self.accumulate(&mut session).await
    }

    async fn accumulate(&self, session: &mut PaginationSession) -> FeedUpdate {
        let accumulation = self
            .paginator
            .accumulate(session, self.initial_count, self.accumulation)
            .await;

        info!(
            handle = self.handle(),
            items = accumulation.items.len(),
            pages = accumulation.pages_fetched,
            stop = ?accumulation.stop,
            "Initial feed loaded"
        );

        FeedUpdate {
            items: accumulation.items,
            mode: RenderMode::Replace,
            has_more: session.has_more(),
            stop: accumulation.stop,
        }
    }
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("paginator", &self.paginator)
            .field("initial_count", &self.initial_count)
            .field("accumulation", &self.accumulation)
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}
