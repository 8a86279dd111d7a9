//! Render module
//!
//! The boundary between loaded feed data and whatever draws it.
//!
//! # Overview
//!
//! A `RenderSink` receives the profile (or an unavailable marker), ordered
//! pages of accepted items with a replace/append flag, and terminal failures.
//! User-controlled profile text is first split into typed `Segment`s by
//! `linkify`; only the sink turns segments into markup.
//!
//! Two sinks ship with the crate:
//! - `HtmlPage` builds the gallery document (and `feed_fragment` the
//!   append-only card markup)
//! - `JsonLinesSink` writes one JSON object per line to any `io::Write`

mod format;
mod html;
mod json;
mod text;

pub use format::format_count;
pub use html::{escape_html, feed_fragment, render_segments, HtmlPage};
pub use json::JsonLinesSink;
pub use text::{linkify, Linkifier, Segment};

use crate::error::Result;
use crate::feed::{FeedItem, ProfileSummary};
use crate::pagination::FailureReason;
use serde::{Deserialize, Serialize};

/// How a page of items relates to what is already drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Discard everything drawn so far
    Replace,
    /// Add after the existing items
    Append,
}

/// Consumer of profile and feed updates
pub trait RenderSink {
    /// Draw the profile header, or the unavailable marker for `None`
    fn render_profile(&mut self, profile: Option<&ProfileSummary>) -> Result<()>;

    /// Draw a page of items in order
    fn render_feed(&mut self, items: &[FeedItem], mode: RenderMode) -> Result<()>;

    /// Report a load that ended in failure
    fn render_failure(&mut self, reason: &FailureReason) -> Result<()>;
}
