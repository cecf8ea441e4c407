//! Ingestion: turn any inbound request at `/endpoint/{id}` into a captured entry.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Path, Request, State};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use futures_util::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use crate::capture::{BodyState, CapturedEntry, BODY_READ_FAILURE};
use crate::PreviewEngine;

#[derive(Debug, Deserialize)]
pub struct CapturePath {
    pub id: String,
    /// Anything after the id; kept only as part of the captured path
    #[serde(default)]
    pub rest: Option<String>,
}

/// Always answers 200: the sender never has a reason to retry.
pub async fn capture(
    State(engine): State<PreviewEngine>,
    Path(params): Path<CapturePath>,
    request: Request,
) -> StatusCode {
    let entry = capture_request(request, engine.server.max_body_bytes).await;

    tracing::debug!(
        tenant = %params.id,
        method = %entry.method,
        body_len = entry.body.len(),
        body_state = ?entry.body_state,
        "[Ingest] Captured request"
    );

    engine.store.append(&params.id, entry);
    StatusCode::OK
}

/// Snapshot method, path, headers, peer and (capped) body. Never fails: a
/// broken body stream is recorded as [`BODY_READ_FAILURE`].
pub async fn capture_request(request: Request, max_body_bytes: usize) -> CapturedEntry {
    let received_at = Utc::now();
    let (parts, body) = request.into_parts();

    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    // HeaderMap yields lowercase names, grouped by name
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let (body, body_state) = read_body(body, max_body_bytes).await;

    CapturedEntry {
        id: Uuid::new_v4(),
        method: parts.method.to_string(),
        path,
        headers,
        body,
        body_state,
        remote_addr,
        received_at,
    }
}

/// Read at most `limit` bytes. Stops reading once the cap is hit.
pub async fn read_body(body: Body, limit: usize) -> (Bytes, BodyState) {
    let mut stream = body.into_data_stream();
    let mut buf = BytesMut::new();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                let room = limit.saturating_sub(buf.len());
                if chunk.len() > room {
                    buf.extend_from_slice(&chunk[..room]);
                    return (buf.freeze(), BodyState::Truncated);
                }
                buf.extend_from_slice(&chunk);
            }
            Err(e) => {
                tracing::warn!("[Ingest] Failed to read request body: {}", e);
                return (Bytes::from_static(BODY_READ_FAILURE.as_bytes()), BodyState::Failed);
            }
        }
    }

    (buf.freeze(), BodyState::Complete)
}
