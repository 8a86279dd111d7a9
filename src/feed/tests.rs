//! Tests for the feed module

use super::*;
use crate::http::{HttpClient, HttpClientConfig};
use crate::test_utils::fixtures::{
    external_entry, image_entry, image_page, multi_image_entry, post_uri, profile_body, reply,
    repost, text_entry, video_entry, TEST_HANDLE,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn entry(value: serde_json::Value) -> FeedViewPost {
    serde_json::from_value(value).unwrap()
}

fn xrpc_client(base_url: &str) -> XrpcClient {
    let config = HttpClientConfig::builder()
        .base_url(base_url)
        .max_retries(0)
        .no_rate_limit()
        .build();
    XrpcClient::new(HttpClient::with_config(config).unwrap())
}

// ============================================================================
// Wire decoding
// ============================================================================

#[test]
fn test_image_entry_flags() {
    let e = entry(image_entry("a1"));
    assert_eq!(e.uri(), Some(post_uri("a1").as_str()));
    assert_eq!(e.embed_kind(), EmbedKind::Images);
    assert!(!e.is_repost());
    assert!(!e.is_reply());
}

#[test]
fn test_video_and_unsupported_embeds() {
    assert_eq!(entry(video_entry("v1")).embed_kind(), EmbedKind::Video);
    assert_eq!(
        entry(external_entry("x1")).embed_kind(),
        EmbedKind::Unsupported
    );
    assert_eq!(entry(text_entry("t1")).embed_kind(), EmbedKind::Unsupported);
    assert!(!EmbedKind::Unsupported.is_supported());
}

#[test]
fn test_reply_root_presence() {
    let with_root = |reply: serde_json::Value| {
        let mut raw = image_entry("q1");
        raw["post"]["record"] = json!({ "text": "", "reply": reply });
        entry(raw)
    };

    assert!(with_root(json!({ "root": null })).is_reply());
    assert!(with_root(json!({ "root": { "uri": "at://x" } })).is_reply());
    assert!(!with_root(json!({ "parent": { "uri": "at://x" } })).is_reply());
    assert!(!with_root(json!(null)).is_reply());
}

#[test]
fn test_repost_and_reply_detection() {
    assert!(entry(repost(image_entry("r1"))).is_repost());
    assert!(entry(reply(image_entry("p1"))).is_reply());

    // a pin reason is not a repost
    let pinned = json!({
        "post": image_entry("pin")["post"].clone(),
        "reason": { "$type": "app.bsky.feed.defs#reasonPin" }
    });
    assert!(!entry(pinned).is_repost());
}

#[test]
fn test_missing_uri() {
    let e = entry(json!({ "post": { "author": { "handle": TEST_HANDLE } } }));
    assert_eq!(e.uri(), None);
    assert!(e.into_item().is_none());

    let e = entry(json!({}));
    assert_eq!(e.uri(), None);
}

#[test]
fn test_into_item_images() {
    let item = entry(multi_image_entry("m1", 3)).into_item().unwrap();

    assert_eq!(item.uri, post_uri("m1"));
    assert_eq!(item.author_handle, TEST_HANDLE);
    assert_eq!(item.like_count, 3);
    assert_eq!(item.reply_count, 1);
    assert_eq!(item.embed_kind(), EmbedKind::Images);
    assert!(item.media.is_multi_image());
    assert_eq!(
        item.media.preview_url(),
        Some("https://cdn.example/m1/0/thumb.jpg")
    );
    assert_eq!(item.media.preview_alt(), "image 0 of m1");
}

#[test]
fn test_into_item_video() {
    let item = entry(video_entry("v9")).into_item().unwrap();
    assert_eq!(
        item.media,
        Media::Video {
            thumbnail: Some("https://video.example/v9/thumb.jpg".to_string())
        }
    );
    assert_eq!(item.media.preview_alt(), "Video thumbnail");
    assert!(!item.media.is_multi_image());
}

#[test]
fn test_preview_falls_back_to_fullsize() {
    let value = json!({
        "post": {
            "uri": post_uri("f1"),
            "author": { "handle": TEST_HANDLE },
            "embed": {
                "$type": IMAGES_VIEW,
                "images": [{ "fullsize": "https://cdn.example/full.jpg" }]
            }
        }
    });
    let item = entry(value).into_item().unwrap();
    assert_eq!(item.media.preview_url(), Some("https://cdn.example/full.jpg"));
    assert_eq!(item.like_count, 0);
}

#[test]
fn test_unsupported_embed_has_no_item() {
    assert!(entry(external_entry("x2")).into_item().is_none());
    assert!(entry(text_entry("t2")).into_item().is_none());
}

#[test]
fn test_post_url_uses_record_key() {
    let item = entry(image_entry("3kabc")).into_item().unwrap();
    assert_eq!(item.record_key(), "3kabc");
    assert_eq!(
        item.post_url("https://bsky.app/"),
        "https://bsky.app/profile/alice.bsky.social/post/3kabc"
    );
}

#[test]
fn test_profile_decoding() {
    let profile: ProfileSummary = serde_json::from_value(profile_body()).unwrap();
    assert_eq!(profile.handle, TEST_HANDLE);
    assert_eq!(profile.display_label(), "Alice");
    assert_eq!(profile.posts_count, 1234);
    assert_eq!(profile.followers_count, 56789);
    assert_eq!(profile.follows_count, 42);
    assert_eq!(
        profile.profile_url("https://bsky.app"),
        "https://bsky.app/profile/alice.bsky.social"
    );
}

#[test]
fn test_profile_display_label_falls_back_to_handle() {
    let profile: ProfileSummary =
        serde_json::from_value(json!({ "handle": "bob.test", "displayName": "" })).unwrap();
    assert_eq!(profile.display_label(), "bob.test");
    assert_eq!(profile.posts_count, 0);
}

// ============================================================================
// XrpcClient
// ============================================================================

#[tokio::test]
async fn test_xrpc_author_feed_first_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.feed.getAuthorFeed"))
        .and(query_param("actor", TEST_HANDLE))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_page("a", 2, Some("c1"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = xrpc_client(&mock_server.uri());
    let body = client.author_feed(TEST_HANDLE, None).await.unwrap();

    assert_eq!(body["cursor"], "c1");
    assert_eq!(body["feed"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_xrpc_author_feed_with_cursor_and_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.feed.getAuthorFeed"))
        .and(query_param("actor", TEST_HANDLE))
        .and(query_param("cursor", "2024-05-01T10:00:00Z"))
        .and(query_param("limit", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_page("b", 1, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = xrpc_client(&mock_server.uri()).with_page_limit(Some(30));
    let body = client
        .author_feed(TEST_HANDLE, Some("2024-05-01T10:00:00Z"))
        .await
        .unwrap();

    assert!(body.get("cursor").is_none());
}

#[tokio::test]
async fn test_xrpc_profile_and_fetch_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.actor.getProfile"))
        .and(query_param("actor", TEST_HANDLE))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&mock_server)
        .await;

    let client = xrpc_client(&mock_server.uri());
    let profile = fetch_profile(&client, TEST_HANDLE).await.unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_fetch_profile_failure_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.actor.getProfile"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "InvalidRequest",
            "message": "Profile not found"
        })))
        .mount(&mock_server)
        .await;

    let client = xrpc_client(&mock_server.uri());
    assert!(fetch_profile(&client, "nobody.invalid").await.is_none());
}
