use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::server::templates::Assets;
use crate::server::{endpoint, ingest, view};
use crate::PreviewEngine;

pub fn build_router(engine: PreviewEngine) -> Router {
    Router::new()
        // Viewer pages
        .route("/", get(endpoint::index))
        .route("/view/{id}", get(view::view))
        // Capture: any method, any sub-path
        .route("/endpoint/{id}", any(ingest::capture))
        // `{*rest}` never matches an empty tail
        .route("/endpoint/{id}/", any(ingest::capture))
        .route("/endpoint/{id}/{*rest}", any(ingest::capture))
        // JSON API
        .route("/api/endpoints", post(endpoint::create))
        .route("/api/endpoints/{id}/requests", get(view::list_requests))
        .route("/api/stats", get(view::stats))
        .route("/static/{*path}", get(static_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

// Serves embedded files under assets/static/
async fn static_handler(Path(path): Path<String>) -> Response {
    let asset_path = format!("static/{}", path.trim_start_matches('/'));

    match Assets::get(&asset_path) {
        Some(content) => {
            let mime = mime_guess::from_path(&asset_path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], Body::from(content.data)).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
