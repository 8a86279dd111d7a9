//! Profile text linkification
//!
//! Splits free text into plain runs, links and line breaks. Nothing here is
//! escaped; segments carry raw text and sinks escape on output.

use crate::config::DEFAULT_WEB_URL;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Bare `http(s)` URLs; stops at whitespace, quotes, angle brackets, commas and `)`
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhttps?://[^\s<>"',)]+"#).expect("URL pattern is valid")
});

/// DNS-style handles such as `@alice.bsky.social`
static HANDLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)@([a-z0-9][a-z0-9.-]*\.[a-z]{2,})").expect("handle pattern is valid")
});

static HASHTAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_]+)").expect("hashtag pattern is valid"));

const MAX_URL_LABEL_CHARS: usize = 40;

/// One piece of linkified text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text(String),
    Link { href: String, label: String },
    LineBreak,
}

impl Segment {
    fn link(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Link {
            href: href.into(),
            label: label.into(),
        }
    }
}

/// Linkify with links into the public web client
pub fn linkify(text: &str) -> Vec<Segment> {
    Linkifier::default().linkify(text)
}

/// Linkifier resolving handles and hashtags against a web client base URL
#[derive(Debug, Clone)]
pub struct Linkifier {
    web_url: String,
}

impl Default for Linkifier {
    fn default() -> Self {
        Self::new(DEFAULT_WEB_URL)
    }
}

impl Linkifier {
    pub fn new(web_url: impl Into<String>) -> Self {
        let web_url: String = web_url.into();
        Self {
            web_url: web_url.trim_end_matches('/').to_string(),
        }
    }

    /// Split `text` into segments. URLs win over handles and hashtags that
    /// would overlap them.
    pub fn linkify(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                segments.push(Segment::LineBreak);
            }
            self.linkify_line(line, &mut segments);
        }
        segments
    }

    fn linkify_line(&self, line: &str, out: &mut Vec<Segment>) {
        let mut last = 0;
        for m in URL_REGEX.find_iter(line) {
            self.linkify_plain(line, last, m.start(), out);

            let raw = m.as_str();
            let url = raw.trim_end_matches([')', ',', '.']);
            out.push(Segment::link(url, url_label(url)));
            push_text(out, &raw[url.len()..]);

            last = m.end();
        }
        self.linkify_plain(line, last, line.len(), out);
    }

    /// Handles and hashtags in `line[start..end]`
    fn linkify_plain(&self, line: &str, start: usize, end: usize, out: &mut Vec<Segment>) {
        let chunk = &line[start..end];
        let mut links: Vec<(usize, usize, Segment)> = Vec::new();

        for caps in HANDLE_REGEX.captures_iter(chunk) {
            let (Some(whole), Some(handle)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let handle = handle.as_str();
            links.push((
                whole.start(),
                whole.end(),
                Segment::link(format!("{}/profile/{handle}", self.web_url), format!("@{handle}")),
            ));
        }

        for caps in HASHTAG_REGEX.captures_iter(chunk) {
            let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let preceding = line[..start + whole.start()].chars().next_back();
            if preceding.is_some_and(is_word_char) {
                continue;
            }
            let tag = tag.as_str();
            links.push((
                whole.start(),
                whole.end(),
                Segment::link(format!("{}/hashtag/{tag}", self.web_url), format!("#{tag}")),
            ));
        }

        links.sort_by_key(|(start, _, _)| *start);

        let mut pos = 0;
        for (link_start, link_end, segment) in links {
            if link_start < pos {
                continue;
            }
            push_text(out, &chunk[pos..link_start]);
            out.push(segment);
            pos = link_end;
        }
        push_text(out, &chunk[pos..]);
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Display label: no scheme, at most 40 characters plus an ellipsis
fn url_label(url: &str) -> String {
    let without_scheme = ["https://", "http://"]
        .iter()
        .find(|scheme| {
            url.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
        .map_or(url, |scheme| &url[scheme.len()..]);

    if without_scheme.chars().count() > MAX_URL_LABEL_CHARS {
        let truncated: String = without_scheme.chars().take(MAX_URL_LABEL_CHARS).collect();
        format!("{truncated}…")
    } else {
        without_scheme.to_string()
    }
}

/// Append plain text, merging with a preceding text segment
fn push_text(out: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(previous)) = out.last_mut() {
        previous.push_str(text);
    } else {
        out.push(Segment::Text(text.to_string()));
    }
}
