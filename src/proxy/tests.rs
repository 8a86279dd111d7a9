//! Tests for the RSS edge proxy

use super::*;
use crate::config::ProxySettings;
use axum::body::to_bytes;
use axum::http::Request;
use axum::Router;
use pretty_assertions::assert_eq;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>alice</title></channel></rss>"#;

fn proxy_for(server: &MockServer, settings: &ProxySettings) -> Router {
    let proxy = RssProxy::new(format!("{}/profile/alice/rss", server.uri()), settings).unwrap();
    router(proxy)
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

#[tokio::test]
async fn test_passthrough_forces_rss_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/alice/rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(FEED, "text/xml")
                .insert_header("etag", "\"v1\"")
                .insert_header("cache-control", "max-age=60"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = proxy_for(&server, &ProxySettings::default());
    let response = app
        .oneshot(get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], RSS_CONTENT_TYPE);
    assert_eq!(response.headers()["etag"], "\"v1\"");
    assert_eq!(response.headers()[CACHE_CONTROL], "max-age=60");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, FEED.as_bytes());
}

#[tokio::test]
async fn test_edge_cache_control_overrides_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(FEED, "application/xml")
                .insert_header("cache-control", "no-cache"),
        )
        .mount(&server)
        .await;

    let settings = ProxySettings {
        edge_cache_control: Some("public, max-age=300, stale-while-revalidate=600".to_string()),
        ..ProxySettings::default()
    };
    let app = proxy_for(&server, &settings);
    let response = app
        .oneshot(get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response.headers()[CACHE_CONTROL],
        "public, max-age=300, stale-while-revalidate=600"
    );
}

#[tokio::test]
async fn test_conditional_request_yields_bodyless_304() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("if-none-match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304).insert_header("etag", "\"v1\""))
        .expect(1)
        .mount(&server)
        .await;

    let app = proxy_for(&server, &ProxySettings::default());
    let response = app
        .oneshot(
            get("/")
                .header("if-none-match", "\"v1\"")
                .header("if-modified-since", "Tue, 01 Sep 2026 10:00:00 GMT")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(response.headers().get(CONTENT_TYPE).is_none());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].headers.get("if-modified-since").unwrap(),
        "Tue, 01 Sep 2026 10:00:00 GMT"
    );
}

#[tokio::test]
async fn test_only_conditional_headers_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FEED, "text/xml"))
        .mount(&server)
        .await;

    let app = proxy_for(&server, &ProxySettings::default());
    app.oneshot(
        get("/anything/else?x=1")
            .header("cache-control", "no-cache")
            .header("authorization", "Bearer secret")
            .header("cookie", "session=1")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let forwarded = &requests[0];
    assert_eq!(forwarded.url.path(), "/profile/alice/rss");
    assert_eq!(forwarded.headers.get("cache-control").unwrap(), "no-cache");
    assert!(forwarded.headers.get("authorization").is_none());
    assert!(forwarded.headers.get("cookie").is_none());
}

#[tokio::test]
async fn test_upstream_error_status_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let app = proxy_for(&server, &ProxySettings::default());
    let response = app
        .oneshot(get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[CONTENT_TYPE], RSS_CONTENT_TYPE);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, "not found".as_bytes());
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let proxy = RssProxy::new("http://127.0.0.1:1/rss", &ProxySettings::default()).unwrap();
    let response = router(proxy)
        .oneshot(get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_hop_by_hop_headers() {
    assert!(is_hop_by_hop(&HeaderName::from_static("transfer-encoding")));
    assert!(is_hop_by_hop(&HeaderName::from_static("connection")));
    assert!(!is_hop_by_hop(&HeaderName::from_static("etag")));
}

#[test]
fn test_invalid_settings() {
    let settings = ProxySettings {
        edge_cache_control: Some("max-age=1\r\nx-injected: 1".to_string()),
        ..ProxySettings::default()
    };
    let err = RssProxy::new("https://bsky.app/profile/a/rss", &settings).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));

    let err = RssProxy::new("not a url", &ProxySettings::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[test]
fn test_from_config_uses_profile_feed() {
    let config = GalleryConfig {
        handle: "alice.bsky.social".to_string(),
        ..GalleryConfig::default()
    };
    let proxy = RssProxy::from_config(&config).unwrap();
    assert_eq!(
        proxy.upstream(),
        "https://bsky.app/profile/alice.bsky.social/rss"
    );
}
