//! The two eviction policies composed by the capture store.
//!
//! - [`ExpiryPolicy`]: a tenant is dead once `ttl` has passed since its last touch.
//! - [`CapacityPolicy`]: at most `max_tenants` live tenants; the least recently
//!   touched one makes room for a newcomer.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct ExpiryPolicy {
    ttl: Duration,
}

impl ExpiryPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Expired once strictly more than `ttl` has elapsed since `touched_at`.
    pub fn is_expired(&self, touched_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(touched_at) > self.ttl
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CapacityPolicy {
    max_tenants: usize,
}

impl CapacityPolicy {
    /// A zero cap is clamped to 1.
    pub fn new(max_tenants: usize) -> Self {
        Self {
            max_tenants: max_tenants.max(1),
        }
    }

    pub fn max_tenants(&self) -> usize {
        self.max_tenants
    }

    /// Whether one tenant must go before a new one can be admitted.
    pub fn must_evict(&self, live: usize) -> bool {
        live >= self.max_tenants
    }
}
