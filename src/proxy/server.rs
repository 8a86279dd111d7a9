//! Standalone proxy server

use super::RssProxy;
use crate::error::{Error, Result};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Router answering every path with the proxied feed
pub fn router(proxy: RssProxy) -> Router {
    Router::new()
        .fallback(passthrough)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(proxy))
}

/// Start the proxy on `port`
pub async fn serve(proxy: RssProxy, port: u16) -> Result<()> {
    let upstream = proxy.upstream().to_string();
    let app = router(proxy);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("RSS proxy for {upstream} listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::proxy(format!("Server error: {e}")))?;

    Ok(())
}

/// Handler forwarding one request; upstream transport failures become 502
pub async fn passthrough(State(proxy): State<Arc<RssProxy>>, headers: HeaderMap) -> Response {
    match proxy.forward(&headers).await {
        Ok(response) => response,
        Err(e) => {
            error!(upstream = proxy.upstream(), "RSS passthrough failed: {e}");
            (StatusCode::BAD_GATEWAY, "Upstream feed unavailable").into_response()
        }
    }
}
