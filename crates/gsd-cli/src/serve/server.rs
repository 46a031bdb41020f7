//! HTTP front end over the published snapshot.
//!
//! Requests never wait for a rebuild: each one grabs whatever snapshot is
//! published at that moment and answers from it.

use std::future::Future;
use std::time::Instant;

use axum::{
    Router,
    body::Body,
    extract::{Path, Request, State},
    http::{StatusCode, Uri, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use gsd_docs::SnapshotStore;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::assets;
use crate::error::{CliError, Result};

/// Build the router serving `store` and the embedded assets.
pub fn router(store: SnapshotStore) -> Router {
    Router::new()
        .route("/favicon.ico", get(handle_favicon))
        .route("/_static/{*path}", get(handle_static))
        .fallback(handle_page)
        .layer(middleware::from_fn(log_request))
        .layer(CompressionLayer::new())
        .with_state(store)
}

/// Bind the listen address, e.g. `localhost:3000`.
pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    store: SnapshotStore,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CliError::Server(format!("Server error: {}", e)))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    tracing::debug!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "request"
    );
    response
}

async fn handle_favicon() -> Response {
    serve_asset("favicon.ico")
}

async fn handle_static(Path(path): Path<String>) -> Response {
    serve_asset(&format!("_static/{}", path))
}

fn serve_asset(path: &str) -> Response {
    match assets::get(path) {
        Some(asset) => (
            [
                (header::CONTENT_TYPE, asset.content_type),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            asset.data,
        )
            .into_response(),
        None => text(StatusCode::NOT_FOUND, "assets not found"),
    }
}

async fn handle_page(State(store): State<SnapshotStore>, uri: Uri) -> Response {
    let Some(snapshot) = store.current() else {
        return text(StatusCode::SERVICE_UNAVAILABLE, "not built yet");
    };

    match snapshot.get(page_key(uri.path())) {
        Some(page) => (
            [
                (header::CONTENT_TYPE, page.content_type),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from(page.content.to_vec()),
        )
            .into_response(),
        None => text(StatusCode::NOT_FOUND, "document not found"),
    }
}

/// Snapshot key for a request path.
///
/// `/` is the index; `/pkg/`, `/pkg/index.html` and `/pkg` all name the
/// package page, matching the layout `gsd build` writes.
fn page_key(path: &str) -> &str {
    let key = path.trim_start_matches('/');
    let key = key.strip_suffix("index.html").unwrap_or(key);
    key.trim_end_matches('/')
}

fn text(status: StatusCode, message: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], message).into_response()
}
