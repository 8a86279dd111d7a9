// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Skyfolio
//!
//! A media gallery for one Bluesky profile: the profile header plus an
//! infinitely scrolling grid of the subject's image and video posts, read
//! from the public AppView. A small edge proxy serves the profile's RSS feed
//! with conditional requests passed through.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skyfolio::{Gallery, GalleryConfig, HtmlPage, RenderSink};
//!
//! #[tokio::main]
//! async fn main() -> skyfolio::Result<()> {
//!     let config = GalleryConfig::from_yaml_str("handle: alice.bsky.social")?;
//!     let gallery = Gallery::new(skyfolio::cli::build_source(&config)?, &config);
//!
//!     let mut page = HtmlPage::new(&config.web_url);
//!     page.render_profile(gallery.load_profile().await.as_ref())?;
//!     gallery.load_initial().await.render_into(&mut page)?;
//!
//!     // one more page, as a scroll event would request it
//!     if let Some(update) = gallery.load_more().await.into_update() {
//!         update.render_into(&mut page)?;
//!     }
//!
//!     std::fs::write("gallery.html", page.document())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Gallery                               │
//! │  load_profile()   load_initial()   load_more()   reload()    │
//! │  owns PaginationSession + in-flight guard                    │
//! └──────────────────────────────────────────────────────────────┘
//!                 │                                 │ FeedUpdate
//! ┌───────────────┴───────────────┐   ┌─────────────┴─────────────┐
//! │        FeedPaginator          │   │        RenderSink         │
//! │ filter → dedup → stall check  │   │ HtmlPage   JsonLinesSink  │
//! └───────────────────────────────┘   └───────────────────────────┘
//!                 │
//! ┌───────────────┴───────────────┐   ┌───────────────────────────┐
//! │  FeedSource (XrpcClient)      │   │  RssProxy (edge)          │
//! │  HttpClient: retry, backoff,  │   │  conditional passthrough  │
//! │  timeout, rate limit          │   │                           │
//! └───────────────────────────────┘   └───────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// AppView wire types and the feed source
pub mod feed;

/// Cursor pagination, filtering and deduplication
pub mod pagination;

/// Gallery load sequence and in-flight guard
pub mod gallery;

/// Render sinks and profile text linkification
pub mod render;

/// RSS edge proxy
pub mod proxy;

/// YAML configuration
pub mod config;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod test_utils;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, GalleryConfig};
pub use feed::{FeedItem, FeedSource, ProfileSummary, XrpcClient};
pub use gallery::{FeedUpdate, Gallery, LoadMore};
pub use pagination::{FeedPaginator, PageOutcome, PaginationSession};
pub use proxy::RssProxy;
pub use render::{HtmlPage, RenderMode, RenderSink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
