//! Read path: fetch a tenant's history, order it newest-first, render it.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;

use crate::capture::{sort_newest_first, BodyState, CaptureStore, CapturedEntry, StoreStats};
use crate::server::error::ServerError;
use crate::server::templates::VIEW;
use crate::PreviewEngine;

// ========================================
// MODELS
// ========================================

#[derive(Debug, Serialize)]
pub struct HeaderView {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct RequestView {
    pub id: String,
    pub method: String,
    pub path: String,
    pub headers: Vec<HeaderView>,
    /// "empty", "json", "text" or "binary"
    pub body_kind: &'static str,
    /// JSON pretty-printed, text as-is, binary as 0x-prefixed hex
    pub body: String,
    pub body_len: usize,
    pub body_state: BodyState,
    pub truncated: bool,
    pub failed: bool,
    pub remote_addr: Option<String>,
    /// RFC 3339, UTC
    pub received_at: String,
}

impl From<&CapturedEntry> for RequestView {
    fn from(entry: &CapturedEntry) -> Self {
        let (body_kind, body) = body_preview(&entry.body);
        Self {
            id: entry.id.to_string(),
            method: entry.method.clone(),
            path: entry.path.clone(),
            headers: entry
                .headers
                .iter()
                .map(|(name, value)| HeaderView {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
            body_kind,
            body,
            body_len: entry.body.len(),
            body_state: entry.body_state,
            truncated: entry.body_state == BodyState::Truncated,
            failed: entry.body_state == BodyState::Failed,
            remote_addr: entry.remote_addr.map(|addr| addr.to_string()),
            received_at: entry.received_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct ViewPage {
    endpoint_url: String,
    view_url: String,
    requests: Vec<RequestView>,
    ring_capacity: usize,
    /// Deliveries overwritten by newer ones
    dropped: u64,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub uptime_secs: u64,
    pub store: StoreStats,
}

// ========================================
// HISTORY
// ========================================

/// Entries for `key`, newest first, plus how many older ones were overwritten.
/// An absent or expired tenant reads as empty.
pub fn load_history(store: &CaptureStore, key: &str) -> (Vec<CapturedEntry>, u64) {
    match store.get(key) {
        Some(history) => {
            let (mut entries, pushed) = history.snapshot_with_total();
            let dropped = pushed.saturating_sub(entries.len() as u64);
            sort_newest_first(&mut entries);
            (entries, dropped)
        }
        None => (Vec::new(), 0),
    }
}

/// Converts a captured body into something printable.
pub fn body_preview(body: &Bytes) -> (&'static str, String) {
    if body.is_empty() {
        return ("empty", String::new());
    }

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Ok(pretty) = serde_json::to_string_pretty(&value) {
            return ("json", pretty);
        }
    }

    match std::str::from_utf8(body) {
        Ok(text) => ("text", text.to_string()),
        Err(_) => ("binary", format!("0x{}", hex::encode(body))),
    }
}

// ========================================
// HANDLERS
// ========================================

pub async fn view(
    State(engine): State<PreviewEngine>,
    Path(id): Path<String>,
) -> Result<Html<String>, ServerError> {
    let (entries, dropped) = load_history(&engine.store, &id);

    let page = ViewPage {
        endpoint_url: engine.server.url(&format!("/endpoint/{}", id)),
        view_url: engine.server.url(&format!("/view/{}", id)),
        requests: entries.iter().map(RequestView::from).collect(),
        ring_capacity: engine.store.ring_capacity(),
        dropped,
    };

    Ok(Html(engine.templates.render(VIEW, &page)?))
}

pub async fn list_requests(
    State(engine): State<PreviewEngine>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let (entries, _) = load_history(&engine.store, &id);
    let views: Vec<RequestView> = entries.iter().map(RequestView::from).collect();
    Json(views)
}

pub async fn stats(State(engine): State<PreviewEngine>) -> impl IntoResponse {
    Json(StatsResponse {
        uptime_secs: engine.start_time.elapsed().as_secs(),
        store: engine.store.stats(),
    })
}
