//! HTTP server mode: the gallery page, its infinite-scroll endpoints and the
//! RSS passthrough

use axum::{
    extract::{FromRef, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::cli::runner::{build_source, cancel_on_ctrl_c, render_page};
use crate::config::GalleryConfig;
use crate::error::{Error, Result};
use crate::feed::ProfileSummary;
use crate::gallery::{FeedUpdate, Gallery, LoadMore};
use crate::proxy::{self, RssProxy};
use crate::render::{feed_fragment, HtmlPage};

/// Response header telling the page script whether to keep scrolling
pub const HAS_MORE_HEADER: HeaderName = HeaderName::from_static("x-has-more");

/// App state shared across handlers
#[derive(Clone)]
pub struct AppState {
    gallery: Arc<Gallery>,
    proxy: Arc<RssProxy>,
    profile: Option<Arc<ProfileSummary>>,
    web_url: Arc<str>,
}

impl AppState {
    pub fn new(
        gallery: Gallery,
        proxy: RssProxy,
        profile: Option<ProfileSummary>,
        web_url: impl Into<String>,
    ) -> Self {
        let web_url: String = web_url.into();
        Self {
            gallery: Arc::new(gallery),
            proxy: Arc::new(proxy),
            profile: profile.map(Arc::new),
            web_url: Arc::from(web_url),
        }
    }
}

impl FromRef<AppState> for Arc<RssProxy> {
    fn from_ref(state: &AppState) -> Self {
        state.proxy.clone()
    }
}

/// Handler error rendered as a 500
struct ServerError(Error);

impl From<Error> for ServerError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Gallery routes
pub fn gallery_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/feed/more", get(more))
        .route("/feed/reload", post(reload))
        .route("/rss", get(proxy::passthrough))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gallery server on `port`
pub async fn serve(config: GalleryConfig, port: u16) -> Result<()> {
    let shutdown = cancel_on_ctrl_c();
    let gallery = Gallery::new(build_source(&config)?, &config).with_cancellation(shutdown.clone());
    let proxy = RssProxy::from_config(&config)?;

    // profile is read once at startup
    let profile = gallery.load_profile().await;
    let state = AppState::new(gallery, proxy, profile, config.web_url.clone());
    let app = gallery_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(handle = %config.handle, "Gallery listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Full page: profile plus a freshly reloaded initial set
async fn index(State(state): State<AppState>) -> std::result::Result<Html<String>, ServerError> {
    let update = state.gallery.reload().await;
    let page = render_page(&state.web_url, state.profile.as_deref(), &update, true)?;
    Ok(Html(page.document()))
}

/// Next page as card markup; 204 once exhausted, 409 while a load is running
async fn more(State(state): State<AppState>) -> Response {
    match state.gallery.load_more().await {
        LoadMore::Loaded(update) => {
            fragment_response(&update, &feed_fragment(&update.items, &state.web_url))
        }
        LoadMore::Busy => StatusCode::CONFLICT.into_response(),
        LoadMore::Exhausted => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Reset the session and return the new initial set
async fn reload(State(state): State<AppState>) -> std::result::Result<Response, ServerError> {
    let update = state.gallery.reload().await;
    let mut page = HtmlPage::new(&*state.web_url);
    update.render_into(&mut page)?;
    Ok(fragment_response(&update, page.feed_html()))
}

fn fragment_response(update: &FeedUpdate, body: &str) -> Response {
    let has_more = HeaderValue::from_static(if update.has_more { "true" } else { "false" });
    ([(HAS_MORE_HEADER, has_more)], Html(body.to_string())).into_response()
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
