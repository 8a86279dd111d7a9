//! Feed types
//!
//! Wire shapes returned by the AppView (`app.bsky.feed.getAuthorFeed`,
//! `app.bsky.actor.getProfile`) and the immutable domain values built from them.

use serde::{Deserialize, Deserializer, Serialize};

/// `$type` of an image-set embed view
pub const IMAGES_VIEW: &str = "app.bsky.embed.images#view";

/// `$type` of a video embed view
pub const VIDEO_VIEW: &str = "app.bsky.embed.video#view";

/// `$type` of the reason attached to reposted entries
pub const REASON_REPOST: &str = "app.bsky.feed.defs#reasonRepost";

// ============================================================================
// Wire types
// ============================================================================

/// One raw entry of the `feed` array
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedViewPost {
    #[serde(default)]
    pub post: Option<PostView>,
    #[serde(default)]
    pub reason: Option<ReasonView>,
}

/// The post inside a feed entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorView>,
    #[serde(default)]
    pub embed: Option<EmbedView>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub reply_count: Option<u64>,
    #[serde(default)]
    pub record: Option<PostRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorView {
    #[serde(default)]
    pub handle: String,
}

/// The subset of the post record we look at
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostRecord {
    #[serde(default)]
    pub reply: Option<ReplyRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyRef {
    /// `Some` whenever the key is present, including an explicit `null`
    #[serde(default, deserialize_with = "present")]
    pub root: Option<serde_json::Value>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Why an entry appears in the author feed (reposts, pins)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReasonView {
    #[serde(rename = "$type", default)]
    pub kind: Option<String>,
}

/// Hydrated embed union, discriminated by `$type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "$type")]
pub enum EmbedView {
    #[serde(rename = "app.bsky.embed.images#view")]
    Images {
        #[serde(default)]
        images: Vec<ImageView>,
    },
    #[serde(rename = "app.bsky.embed.video#view")]
    Video {
        #[serde(default)]
        thumbnail: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageView {
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub fullsize: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl FeedViewPost {
    /// The post identifier, if the entry carries one
    pub fn uri(&self) -> Option<&str> {
        self.post
            .as_ref()
            .and_then(|p| p.uri.as_deref())
            .filter(|uri| !uri.is_empty())
    }

    /// Reposts are marked by their reason tag
    pub fn is_repost(&self) -> bool {
        self.reason
            .as_ref()
            .and_then(|r| r.kind.as_deref())
            .is_some_and(|kind| kind == REASON_REPOST)
    }

    /// A reply is any post whose record references a thread root
    pub fn is_reply(&self) -> bool {
        self.post
            .as_ref()
            .and_then(|p| p.record.as_ref())
            .and_then(|r| r.reply.as_ref())
            .is_some_and(|reply| reply.root.is_some())
    }

    pub fn embed_kind(&self) -> EmbedKind {
        match self.post.as_ref().and_then(|p| p.embed.as_ref()) {
            Some(EmbedView::Images { .. }) => EmbedKind::Images,
            Some(EmbedView::Video { .. }) => EmbedKind::Video,
            Some(EmbedView::Unsupported) | None => EmbedKind::Unsupported,
        }
    }

    /// Build the domain item. `None` when the entry has no identifier or no
    /// supported media.
    pub fn into_item(self) -> Option<FeedItem> {
        let is_repost = self.is_repost();
        let is_reply = self.is_reply();
        let post = self.post?;
        let uri = post.uri.filter(|uri| !uri.is_empty())?;

        let media = match post.embed? {
            EmbedView::Images { images } => Media::Images {
                images: images
                    .into_iter()
                    .map(|image| ImageRef {
                        thumb: image.thumb,
                        fullsize: image.fullsize,
                        alt: image.alt.unwrap_or_default(),
                    })
                    .collect(),
            },
            EmbedView::Video { thumbnail } => Media::Video { thumbnail },
            EmbedView::Unsupported => return None,
        };

        Some(FeedItem {
            uri,
            author_handle: post.author.map(|a| a.handle).unwrap_or_default(),
            is_repost,
            is_reply,
            media,
            like_count: post.like_count.unwrap_or(0),
            reply_count: post.reply_count.unwrap_or(0),
        })
    }
}

// ============================================================================
// Domain types
// ============================================================================

/// Kind of media attached to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedKind {
    Images,
    Video,
    Unsupported,
}

impl EmbedKind {
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// One image of an image-set embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub thumb: Option<String>,
    pub fullsize: Option<String>,
    pub alt: String,
}

/// Supported media payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    Images { images: Vec<ImageRef> },
    Video { thumbnail: Option<String> },
}

impl Media {
    pub fn kind(&self) -> EmbedKind {
        match self {
            Self::Images { .. } => EmbedKind::Images,
            Self::Video { .. } => EmbedKind::Video,
        }
    }

    /// Thumbnail to show in the grid
    pub fn preview_url(&self) -> Option<&str> {
        match self {
            Self::Images { images } => images
                .first()
                .and_then(|image| image.thumb.as_deref().or(image.fullsize.as_deref())),
            Self::Video { thumbnail } => thumbnail.as_deref(),
        }
    }

    /// Alt text for the preview
    pub fn preview_alt(&self) -> &str {
        match self {
            Self::Images { images } => images.first().map_or("", |image| image.alt.as_str()),
            Self::Video { .. } => "Video thumbnail",
        }
    }

    pub fn is_multi_image(&self) -> bool {
        matches!(self, Self::Images { images } if images.len() > 1)
    }
}

/// An accepted media post. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub uri: String,
    pub author_handle: String,
    pub is_repost: bool,
    pub is_reply: bool,
    pub media: Media,
    pub like_count: u64,
    pub reply_count: u64,
}

impl FeedItem {
    pub fn embed_kind(&self) -> EmbedKind {
        self.media.kind()
    }

    /// Record key: the last path segment of the `at://` uri
    pub fn record_key(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or(&self.uri)
    }

    /// Public web URL of the post
    pub fn post_url(&self, web_url: &str) -> String {
        format!(
            "{}/profile/{}/post/{}",
            web_url.trim_end_matches('/'),
            self.author_handle,
            self.record_key()
        )
    }
}

/// Display snapshot of the subject's profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub posts_count: u64,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub follows_count: u64,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProfileSummary {
    /// Display name, falling back to the handle
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.handle)
    }

    pub fn profile_url(&self, web_url: &str) -> String {
        format!("{}/profile/{}", web_url.trim_end_matches('/'), self.handle)
    }
}
