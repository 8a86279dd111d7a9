//! Test fixtures
//!
//! Factory functions for raw AppView payloads with sensible defaults.

use crate::feed::{FeedItem, FeedViewPost, ProfileSummary, IMAGES_VIEW, REASON_REPOST, VIDEO_VIEW};
use crate::types::JsonValue;
use serde_json::json;

pub const TEST_HANDLE: &str = "alice.bsky.social";

/// Post uri for a record key
pub fn post_uri(rkey: &str) -> String {
    format!("at://did:plc:alice/app.bsky.feed.post/{rkey}")
}

fn entry_with_embed(rkey: &str, embed: Option<JsonValue>) -> JsonValue {
    let mut post = json!({
        "uri": post_uri(rkey),
        "cid": format!("bafy{rkey}"),
        "author": { "did": "did:plc:alice", "handle": TEST_HANDLE },
        "record": { "$type": "app.bsky.feed.post", "text": "hello" },
        "likeCount": 3,
        "replyCount": 1
    });
    if let Some(embed) = embed {
        post["embed"] = embed;
    }
    json!({ "post": post })
}

/// Entry with a single-image embed
pub fn image_entry(rkey: &str) -> JsonValue {
    multi_image_entry(rkey, 1)
}

/// Entry with an image-set embed of `count` images
pub fn multi_image_entry(rkey: &str, count: usize) -> JsonValue {
    let images: Vec<JsonValue> = (0..count)
        .map(|i| {
            json!({
                "thumb": format!("https://cdn.example/{rkey}/{i}/thumb.jpg"),
                "fullsize": format!("https://cdn.example/{rkey}/{i}/full.jpg"),
                "alt": format!("image {i} of {rkey}")
            })
        })
        .collect();
    entry_with_embed(rkey, Some(json!({ "$type": IMAGES_VIEW, "images": images })))
}

/// Entry with a video embed
pub fn video_entry(rkey: &str) -> JsonValue {
    entry_with_embed(
        rkey,
        Some(json!({
            "$type": VIDEO_VIEW,
            "cid": "bafyvideo",
            "playlist": "https://video.example/playlist.m3u8",
            "thumbnail": format!("https://video.example/{rkey}/thumb.jpg")
        })),
    )
}

/// Entry with a link card embed (unsupported)
pub fn external_entry(rkey: &str) -> JsonValue {
    entry_with_embed(
        rkey,
        Some(json!({
            "$type": "app.bsky.embed.external#view",
            "external": { "uri": "https://example.com", "title": "t", "description": "d" }
        })),
    )
}

/// Entry without any embed
pub fn text_entry(rkey: &str) -> JsonValue {
    entry_with_embed(rkey, None)
}

/// Mark an entry as a repost
pub fn repost(mut entry: JsonValue) -> JsonValue {
    entry["reason"] = json!({
        "$type": REASON_REPOST,
        "by": { "did": "did:plc:alice", "handle": TEST_HANDLE }
    });
    entry
}

/// Mark an entry as a reply
pub fn reply(mut entry: JsonValue) -> JsonValue {
    entry["post"]["record"]["reply"] = json!({
        "root": { "uri": post_uri("root"), "cid": "bafyroot" },
        "parent": { "uri": post_uri("root"), "cid": "bafyroot" }
    });
    entry
}

/// A `getAuthorFeed` response body
pub fn feed_page(entries: Vec<JsonValue>, cursor: Option<&str>) -> JsonValue {
    match cursor {
        Some(cursor) => json!({ "feed": entries, "cursor": cursor }),
        None => json!({ "feed": entries }),
    }
}

/// A page of `count` image entries with record keys `{prefix}0..`
pub fn image_page(prefix: &str, count: usize, cursor: Option<&str>) -> JsonValue {
    let entries = (0..count)
        .map(|i| image_entry(&format!("{prefix}{i}")))
        .collect();
    feed_page(entries, cursor)
}

/// A `getProfile` response body
pub fn profile_body() -> JsonValue {
    json!({
        "did": "did:plc:alice",
        "handle": TEST_HANDLE,
        "displayName": "Alice",
        "avatar": "https://cdn.example/avatar.jpg",
        "description": "Photos from #nature by @bob.bsky.social\nhttps://alice.example/about",
        "postsCount": 1234,
        "followersCount": 56789,
        "followsCount": 42
    })
}

/// Decoded profile matching `profile_body`
pub fn profile() -> ProfileSummary {
    serde_json::from_value(profile_body()).unwrap()
}

/// Accepted item for a supported entry
pub fn item(entry: JsonValue) -> FeedItem {
    serde_json::from_value::<FeedViewPost>(entry)
        .unwrap()
        .into_item()
        .unwrap()
}
