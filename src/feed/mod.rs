//! Feed module
//!
//! AppView wire types, the domain values built from them, and the
//! `FeedSource` seam used by the paginator.

mod source;
mod types;

pub use source::{fetch_profile, FeedSource, XrpcClient};
pub use types::{
    AuthorView, EmbedKind, EmbedView, FeedItem, FeedViewPost, ImageRef, ImageView, Media,
    PostRecord, PostView, ProfileSummary, ReasonView, ReplyRef, IMAGES_VIEW, REASON_REPOST,
    VIDEO_VIEW,
};

#[cfg(test)]
mod tests;
