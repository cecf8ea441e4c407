use std::net::SocketAddr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Payload stored in place of the body when the body stream fails mid-read.
pub const BODY_READ_FAILURE: &str = "Server Error: failed to parse data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyState {
    Complete,
    /// Body exceeded the capture cap; only the first `max_body_bytes` were kept
    Truncated,
    /// Body stream errored; `body` holds [`BODY_READ_FAILURE`]
    Failed,
}

/// One inbound delivery, frozen at capture time.
#[derive(Debug, Clone)]
pub struct CapturedEntry {
    pub id: Uuid,
    pub method: String,
    /// Path and query exactly as received
    pub path: String,
    /// Arrival order, lowercase names, repeated headers kept as separate pairs
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub body_state: BodyState,
    pub remote_addr: Option<SocketAddr>,
    pub received_at: DateTime<Utc>,
}

impl CapturedEntry {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            body_state: BodyState::Complete,
            remote_addr: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>, state: BodyState) -> Self {
        self.body = body.into();
        self.body_state = state;
        self
    }

    pub fn received_at(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = at;
        self
    }

    /// First value for `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Newest first. Stable, so equal timestamps keep the order they came in.
pub fn sort_newest_first(entries: &mut [CapturedEntry]) {
    entries.sort_by(|a, b| b.received_at.cmp(&a.received_at));
}
