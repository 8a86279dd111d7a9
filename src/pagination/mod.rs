//! Pagination module
//!
//! Cursor pagination over the author feed with media filtering and
//! per-session deduplication.
//!
//! # Overview
//!
//! A `PaginationSession` holds the cursor and the set of accepted post uris.
//! `FeedPaginator::fetch_page` advances it by one page and reports a tagged
//! `PageOutcome`; `FeedPaginator::accumulate` fills an initial set.

mod paginator;
mod types;

pub use paginator::FeedPaginator;
pub use types::{
    Accumulation, AccumulationPolicy, FailureReason, FilterPolicy, PageOutcome,
    PaginationSession, Rejection, StopReason,
};
