//! HTML render sink
//!
//! Markup is only ever produced here. Every piece of user-controlled text
//! (handles, names, descriptions, alt text, URLs) passes through
//! `escape_html` on its way out.

use super::format::format_count;
use super::text::{Linkifier, Segment};
use super::{RenderMode, RenderSink};
use crate::config::DEFAULT_WEB_URL;
use crate::error::Result;
use crate::feed::{FeedItem, Media, ProfileSummary};
use crate::pagination::FailureReason;
use std::fmt::Write as _;
use tracing::debug;

pub const PROFILE_UNAVAILABLE: &str = "Profile unavailable.";
pub const NO_MEDIA_POSTS: &str = "No media posts found for this handle.";
pub const FEED_ERROR: &str = "Error loading feed.";

const EXTERNAL: &str = r#"target="_blank" rel="noopener noreferrer""#;

const MULTI_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="currentColor"><path d="M4 4h12v12H4z" opacity=".5"/><path d="M8 8h12v12H8z"/></svg>"#;
const VIDEO_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="currentColor"><path d="M8 5v14l11-7z"/></svg>"#;
const LIKE_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="16" height="16" fill="currentColor"><path d="M12 21.5 3.5 13A5.5 5.5 0 0 1 12 5.1a5.5 5.5 0 0 1 8.5 7.9z"/></svg>"#;
const REPLY_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="16" height="16" fill="currentColor"><path d="M10 3h4a8 8 0 0 1 0 16v3.5C9 20.5 2 17.5 2 11a8 8 0 0 1 8-8z"/></svg>"#;

const STYLE: &str = r"
body { margin: 0 auto; max-width: 960px; font-family: system-ui, sans-serif; }
#profile { padding: 16px; }
.profile-header-row { display: flex; align-items: center; gap: 16px; }
.profile-avatar { width: 80px; height: 80px; border-radius: 50%; object-fit: cover; }
.profile-topline { display: flex; flex: 1; justify-content: space-between; align-items: center; }
.follow-button { padding: 6px 16px; border-radius: 999px; background: #1185fe; color: #fff; text-decoration: none; }
.profile-counts { display: flex; gap: 24px; margin: 12px 0; }
.profile-counts a { color: inherit; text-decoration: none; }
.count-num { font-weight: 600; }
.profile-name { font-weight: 600; }
#feed { display: grid; grid-template-columns: repeat(3, 1fr); gap: 4px; }
.post { position: relative; display: block; color: inherit; text-decoration: none; }
.single-photo { position: relative; aspect-ratio: 1; overflow: hidden; }
.single-photo img { width: 100%; height: 100%; object-fit: cover; }
.multi-icon, .video-icon { position: absolute; top: 8px; right: 8px; width: 20px; color: #fff; }
.hover-overlay { position: absolute; inset: 0; display: none; align-items: center; justify-content: center; background: rgba(0, 0, 0, .4); color: #fff; }
.post:hover .hover-overlay { display: flex; }
.counts { display: flex; gap: 12px; }
.count { display: inline-flex; align-items: center; gap: 4px; }
.meta-bar { display: none; }
.empty { grid-column: 1 / -1; padding: 32px; text-align: center; color: #666; }
";

const INFINITE_SCROLL: &str = r#"
(() => {
  const feed = document.getElementById("feed");
  let loading = false;
  let done = feed.dataset.hasMore !== "true";
  window.addEventListener("scroll", async () => {
    if (loading || done) return;
    const bottom = window.scrollY + window.innerHeight;
    if (bottom < document.documentElement.scrollHeight - 200) return;
    loading = true;
    try {
      const res = await fetch("/feed/more");
      if (res.status === 204) { done = true; return; }
      if (res.ok) {
        feed.insertAdjacentHTML("beforeend", await res.text());
        done = res.headers.get("x-has-more") === "false";
      }
    } catch (e) {
      console.error("Failed to load more posts:", e);
    } finally {
      loading = false;
    }
  });
})();
"#;

/// Escape text for element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Materialize linkified segments
pub fn render_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(&escape_html(text)),
            Segment::Link { href, label } => {
                let _ = write!(
                    out,
                    r#"<a href="{}" {EXTERNAL}>{}</a>"#,
                    escape_html(href),
                    escape_html(label)
                );
            }
            Segment::LineBreak => out.push_str("<br>"),
        }
    }
    out
}

/// Card markup for a page of items, as appended by infinite scroll
pub fn feed_fragment(items: &[FeedItem], web_url: &str) -> String {
    let mut out = String::new();
    for item in items {
        render_card(&mut out, item, web_url);
    }
    out
}

fn render_card(out: &mut String, item: &FeedItem, web_url: &str) {
    let counts = format!(
        r#"<div class="counts"><span class="count like">{LIKE_ICON} {}</span><span class="count reply">{REPLY_ICON} {}</span></div>"#,
        item.like_count, item.reply_count
    );

    let marker = match &item.media {
        Media::Images { .. } if item.media.is_multi_image() => {
            format!(r#"<div class="multi-icon">{MULTI_ICON}</div>"#)
        }
        Media::Images { .. } => String::new(),
        Media::Video { .. } => format!(r#"<div class="video-icon">{VIDEO_ICON}</div>"#),
    };

    let _ = write!(
        out,
        concat!(
            r#"<a class="post" href="{href}" {external}>"#,
            r#"<div class="single-photo">"#,
            r#"<img src="{src}" alt="{alt}" loading="lazy">{marker}"#,
            r#"<div class="hover-overlay"><div class="overlay-meta">{counts}</div></div>"#,
            r#"</div>"#,
            r#"<div class="meta-bar">{counts}</div>"#,
            r#"</a>"#
        ),
        href = escape_html(&item.post_url(web_url)),
        external = EXTERNAL,
        src = escape_html(item.media.preview_url().unwrap_or_default()),
        alt = escape_html(item.media.preview_alt()),
        marker = marker,
        counts = counts,
    );
}

/// Gallery document built up by render calls
#[derive(Debug, Clone)]
pub struct HtmlPage {
    web_url: String,
    linkifier: Linkifier,
    title: String,
    profile: String,
    feed: String,
    card_count: usize,
    has_more: bool,
    infinite_scroll: bool,
}

impl Default for HtmlPage {
    fn default() -> Self {
        Self::new(DEFAULT_WEB_URL)
    }
}

impl HtmlPage {
    pub fn new(web_url: impl Into<String>) -> Self {
        let web_url: String = web_url.into();
        let web_url = web_url.trim_end_matches('/').to_string();
        Self {
            linkifier: Linkifier::new(web_url.clone()),
            web_url,
            title: "Gallery".to_string(),
            profile: String::new(),
            feed: String::new(),
            card_count: 0,
            has_more: false,
            infinite_scroll: false,
        }
    }

    /// Include the script that appends `/feed/more` fragments on scroll
    #[must_use]
    pub fn with_infinite_scroll(mut self) -> Self {
        self.infinite_scroll = true;
        self
    }

    /// Whether the script should try to load more after the initial set
    pub fn set_has_more(&mut self, has_more: bool) {
        self.has_more = has_more;
    }

    pub fn profile_html(&self) -> &str {
        &self.profile
    }

    pub fn feed_html(&self) -> &str {
        &self.feed
    }

    /// Number of post cards currently drawn
    pub fn card_count(&self) -> usize {
        self.card_count
    }

    /// Complete HTML document
    pub fn document(&self) -> String {
        let script = if self.infinite_scroll {
            format!("<script>{INFINITE_SCROLL}</script>")
        } else {
            String::new()
        };

        format!(
            concat!(
                "<!DOCTYPE html>\n",
                r#"<html lang="en"><head><meta charset="utf-8">"#,
                r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
                "<title>{title}</title><style>{style}</style></head>\n",
                "<body>\n",
                r#"<div id="profile">{profile}</div>"#,
                "\n",
                r#"<div id="feed" data-has-more="{has_more}">{feed}</div>"#,
                "\n{script}</body></html>\n"
            ),
            title = escape_html(&self.title),
            style = STYLE,
            profile = self.profile,
            has_more = self.has_more,
            feed = self.feed,
            script = script,
        )
    }

    fn render_profile_header(&self, profile: &ProfileSummary) -> String {
        let profile_url = escape_html(&profile.profile_url(&self.web_url));
        let handle = escape_html(&profile.handle);
        let display_name = escape_html(profile.display_label());
        let description = profile
            .description
            .as_deref()
            .map(|text| render_segments(&self.linkifier.linkify(text)))
            .unwrap_or_default();

        let avatar = match profile.avatar.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => format!(
                r#"<img class="profile-avatar" src="{}" alt="{display_name}'s avatar" onerror="this.style.display='none'">"#,
                escape_html(url)
            ),
            None => String::new(),
        };

        let count_link = |suffix: &str, count: u64, label: &str| {
            format!(
                r#"<a href="{profile_url}{suffix}" {EXTERNAL}><div><span class="count-num">{}</span> <span class="count-label">{label}</span></div></a>"#,
                format_count(count)
            )
        };

        format!(
            concat!(
                r#"<div class="profile-header-row">{avatar}"#,
                r#"<div class="profile-topline">"#,
                r#"<div class="profile-handle"><a href="{url}" {external}>@{handle}</a></div>"#,
                r#"<a class="follow-button" href="{url}" {external}>Follow</a>"#,
                "</div></div>",
                r#"<div class="profile-rest">"#,
                r#"<div class="profile-counts">{posts}{followers}{follows}</div>"#,
                r#"<div class="profile-name">{name}</div>"#,
                r#"<div class="profile-desc">{description}</div>"#,
                "</div>"
            ),
            avatar = avatar,
            url = profile_url,
            external = EXTERNAL,
            handle = handle,
            posts = count_link("", profile.posts_count, "posts"),
            followers = count_link("/followers", profile.followers_count, "followers"),
            follows = count_link("/follows", profile.follows_count, "following"),
            name = display_name,
            description = description,
        )
    }
}

impl RenderSink for HtmlPage {
    fn render_profile(&mut self, profile: Option<&ProfileSummary>) -> Result<()> {
        match profile {
            Some(profile) => {
                self.title = format!("@{}", profile.handle);
                self.profile = self.render_profile_header(profile);
            }
            None => self.profile = PROFILE_UNAVAILABLE.to_string(),
        }
        Ok(())
    }

    fn render_feed(&mut self, items: &[FeedItem], mode: RenderMode) -> Result<()> {
        if mode == RenderMode::Replace {
            self.feed.clear();
            self.card_count = 0;
            if items.is_empty() {
                self.feed = format!(r#"<div class="empty">{NO_MEDIA_POSTS}</div>"#);
                return Ok(());
            }
        }

        for item in items {
            render_card(&mut self.feed, item, &self.web_url);
        }
        self.card_count += items.len();
        debug!(cards = self.card_count, ?mode, "Rendered feed page");
        Ok(())
    }

    fn render_failure(&mut self, reason: &FailureReason) -> Result<()> {
        debug!(%reason, cards = self.card_count, "Rendering feed failure");
        if self.card_count == 0 {
            self.feed = format!(r#"<div class="empty">{FEED_ERROR}</div>"#);
        }
        Ok(())
    }
}
