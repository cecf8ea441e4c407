//! Capture Store: tenant key -> request history, bounded by tenant count and idle time.
//!
//! One `parking_lot::Mutex` guards the LRU map; every map operation is O(1)
//! amortized under it. Each history has its own lock, so pushes to a tenant are
//! serialized while pushes to different tenants only share the brief lookup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time;

use crate::capture::entry::CapturedEntry;
use crate::capture::history::RequestHistory;
use crate::capture::ident::TenantKey;
use crate::capture::policy::{CapacityPolicy, ExpiryPolicy};
use crate::config::StoreConfig;

struct Slot {
    history: Arc<RequestHistory>,
    touched_at: Instant,
}

type Tenants = LruCache<TenantKey, Slot>;

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    /// Includes expired tenants the sweeper has not reached yet
    pub tenants: usize,
    pub max_tenants: usize,
    pub ring_capacity: usize,
    pub ttl_secs: u64,
    pub touch_on_read: bool,
    pub evicted_by_capacity: u64,
    pub evicted_by_expiry: u64,
}

// ========================================
// CAPTURE STORE
// ========================================

pub struct CaptureStore {
    /// LRU order always matches `touched_at` order: touches happen under the
    /// lock with a clock read taken after acquiring it.
    tenants: Mutex<Tenants>,
    expiry: ExpiryPolicy,
    capacity: CapacityPolicy,
    ring_capacity: usize,
    touch_on_read: bool,
    evicted_by_capacity: AtomicU64,
    evicted_by_expiry: AtomicU64,
}

impl CaptureStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            tenants: Mutex::new(LruCache::unbounded()),
            expiry: ExpiryPolicy::new(config.ttl),
            capacity: CapacityPolicy::new(config.max_tenants),
            ring_capacity: config.ring_capacity.max(1),
            touch_on_read: config.touch_on_read,
            evicted_by_capacity: AtomicU64::new(0),
            evicted_by_expiry: AtomicU64::new(0),
        }
    }

    // ========================================
    // INGESTION PATH
    // ========================================

    /// Live history for `key`, created (and room made for it) if absent or expired.
    /// Refreshes the tenant's TTL and LRU position.
    pub fn get_or_create(&self, key: &str) -> Arc<RequestHistory> {
        let mut tenants = self.tenants.lock();
        let now = Instant::now();
        self.get_or_create_locked(&mut tenants, key, now)
    }

    /// Capture `entry` for `key`. The push runs after the map lock is released.
    pub fn append(&self, key: &str, entry: CapturedEntry) {
        let history = self.get_or_create(key);
        history.push(entry);
    }

    // ========================================
    // READ PATH
    // ========================================

    /// Live history for `key`, never creating one. With `touch_on_read` (the
    /// default) a successful read refreshes the TTL, keeping endpoints that are
    /// being watched alive.
    pub fn get(&self, key: &str) -> Option<Arc<RequestHistory>> {
        let mut tenants = self.tenants.lock();
        let now = Instant::now();
        self.get_locked(&mut tenants, key, now)
    }

    /// Refresh TTL and LRU position without reading. False if absent or expired.
    pub fn touch(&self, key: &str) -> bool {
        let mut tenants = self.tenants.lock();
        let now = Instant::now();
        self.touch_locked(&mut tenants, key, now)
    }

    // ========================================
    // MAINTENANCE
    // ========================================

    /// Drop every expired tenant. Expired tenants sit at the LRU tail, so this
    /// stops at the first live one.
    pub fn purge_expired(&self) -> usize {
        let mut tenants = self.tenants.lock();
        let now = Instant::now();
        self.purge_expired_locked(&mut tenants, now)
    }

    /// Physical tenant count, possibly including expired tenants not yet purged.
    pub fn len(&self) -> usize {
        self.tenants.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ring_capacity(&self) -> usize {
        self.ring_capacity
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            tenants: self.len(),
            max_tenants: self.capacity.max_tenants(),
            ring_capacity: self.ring_capacity,
            ttl_secs: self.expiry.ttl().as_secs(),
            touch_on_read: self.touch_on_read,
            evicted_by_capacity: self.evicted_by_capacity.load(Ordering::Relaxed),
            evicted_by_expiry: self.evicted_by_expiry.load(Ordering::Relaxed),
        }
    }

    // ========================================
    // LOCKED INTERNALS
    // ========================================

    fn get_or_create_locked(&self, tenants: &mut Tenants, key: &str, now: Instant) -> Arc<RequestHistory> {
        let stale = match tenants.get_mut(key) {
            Some(slot) if !self.expiry.is_expired(slot.touched_at, now) => {
                slot.touched_at = now;
                return Arc::clone(&slot.history);
            }
            Some(_) => true,
            None => false,
        };

        // A stale history is never reused; its entries go with it
        if stale {
            tenants.pop(key);
            self.evicted_by_expiry.fetch_add(1, Ordering::Relaxed);
        }

        self.purge_expired_locked(tenants, now);

        if self.capacity.must_evict(tenants.len()) {
            if let Some((evicted, _)) = tenants.pop_lru() {
                self.evicted_by_capacity.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(tenant = %evicted, "[CaptureStore] Evicted least recently used tenant");
            }
        }

        let history = Arc::new(RequestHistory::new(self.ring_capacity));
        tenants.put(
            TenantKey::from(key),
            Slot {
                history: Arc::clone(&history),
                touched_at: now,
            },
        );
        history
    }

    fn get_locked(&self, tenants: &mut Tenants, key: &str, now: Instant) -> Option<Arc<RequestHistory>> {
        let slot = if self.touch_on_read {
            tenants.get_mut(key)
        } else {
            tenants.peek_mut(key)
        }?;

        if self.expiry.is_expired(slot.touched_at, now) {
            tenants.pop(key);
            self.evicted_by_expiry.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        if self.touch_on_read {
            slot.touched_at = now;
        }
        Some(Arc::clone(&slot.history))
    }

    fn touch_locked(&self, tenants: &mut Tenants, key: &str, now: Instant) -> bool {
        let expired = match tenants.get_mut(key) {
            Some(slot) if !self.expiry.is_expired(slot.touched_at, now) => {
                slot.touched_at = now;
                return true;
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            tenants.pop(key);
            self.evicted_by_expiry.fetch_add(1, Ordering::Relaxed);
        }
        false
    }

    fn purge_expired_locked(&self, tenants: &mut Tenants, now: Instant) -> usize {
        let mut purged = 0;
        loop {
            let expired = match tenants.peek_lru() {
                Some((_, slot)) => self.expiry.is_expired(slot.touched_at, now),
                None => false,
            };
            if !expired {
                break;
            }
            tenants.pop_lru();
            purged += 1;
        }
        if purged > 0 {
            self.evicted_by_expiry.fetch_add(purged as u64, Ordering::Relaxed);
        }
        purged
    }
}

/// Background sweep of expired tenants. Holds only a weak reference and stops
/// once the store is dropped.
pub fn spawn_sweeper(store: &Arc<CaptureStore>, every: Duration) -> JoinHandle<()> {
    let weak_store = Arc::downgrade(store);
    let every = every.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.tick().await; // Skip first immediate tick
        loop {
            interval.tick().await;

            match weak_store.upgrade() {
                Some(store) => {
                    let purged = store.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, remaining = store.len(), "[CaptureStore] Swept expired tenants");
                    }
                }
                None => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(30 * 60);

    fn store(max_tenants: usize, touch_on_read: bool) -> CaptureStore {
        CaptureStore::new(StoreConfig {
            ring_capacity: 10,
            max_tenants,
            ttl: TTL,
            touch_on_read,
            ..StoreConfig::default()
        })
    }

    impl CaptureStore {
        fn get_or_create_at(&self, key: &str, now: Instant) -> Arc<RequestHistory> {
            let mut tenants = self.tenants.lock();
            self.get_or_create_locked(&mut tenants, key, now)
        }

        fn get_at(&self, key: &str, now: Instant) -> Option<Arc<RequestHistory>> {
            let mut tenants = self.tenants.lock();
            self.get_locked(&mut tenants, key, now)
        }

        fn touch_at(&self, key: &str, now: Instant) -> bool {
            let mut tenants = self.tenants.lock();
            self.touch_locked(&mut tenants, key, now)
        }

        fn purge_expired_at(&self, now: Instant) -> usize {
            let mut tenants = self.tenants.lock();
            self.purge_expired_locked(&mut tenants, now)
        }
    }

    #[test]
    fn get_never_creates() {
        let store = store(4, true);
        assert!(store.get("missing").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn get_or_create_returns_same_history() {
        let store = store(4, true);
        let a = store.get_or_create("k");
        let b = store.get_or_create("k");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn lru_evicts_oldest_touch() {
        let store = store(2, true);
        let t0 = Instant::now();
        store.get_or_create_at("a", t0);
        store.get_or_create_at("b", t0 + Duration::from_secs(1));
        store.get_or_create_at("c", t0 + Duration::from_secs(2));

        let now = t0 + Duration::from_secs(3);
        assert!(store.get_at("a", now).is_none());
        assert!(store.get_at("b", now).is_some());
        assert!(store.get_at("c", now).is_some());
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evicted_by_capacity, 1);
    }

    #[test]
    fn read_touch_protects_from_lru() {
        let store = store(2, true);
        let t0 = Instant::now();
        store.get_or_create_at("a", t0);
        store.get_or_create_at("b", t0 + Duration::from_secs(1));
        // Viewing `a` makes `b` the eviction candidate
        assert!(store.get_at("a", t0 + Duration::from_secs(2)).is_some());
        store.get_or_create_at("c", t0 + Duration::from_secs(3));

        let now = t0 + Duration::from_secs(4);
        assert!(store.get_at("a", now).is_some());
        assert!(store.get_at("b", now).is_none());
    }

    #[test]
    fn read_without_touch_does_not_protect() {
        let store = store(2, false);
        let t0 = Instant::now();
        store.get_or_create_at("a", t0);
        store.get_or_create_at("b", t0 + Duration::from_secs(1));
        assert!(store.get_at("a", t0 + Duration::from_secs(2)).is_some());
        store.get_or_create_at("c", t0 + Duration::from_secs(3));

        let now = t0 + Duration::from_secs(4);
        assert!(store.get_at("a", now).is_none());
        assert!(store.get_at("b", now).is_some());
    }

    #[test]
    fn expired_tenant_is_unreachable() {
        let store = store(4, true);
        let t0 = Instant::now();
        store.get_or_create_at("a", t0).push(CapturedEntry::new("GET", "/"));

        assert!(store.get_at("a", t0 + TTL).is_some());
        // The read above touched `a`, so the clock restarts from t0 + TTL
        assert!(store.get_at("a", t0 + TTL * 2).is_some());
        assert!(store.get_at("a", t0 + TTL * 3 + Duration::from_millis(1)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn reads_do_not_extend_life_when_touch_disabled() {
        let store = store(4, false);
        let t0 = Instant::now();
        store.get_or_create_at("a", t0);
        assert!(store.get_at("a", t0 + TTL).is_some());
        assert!(store.get_at("a", t0 + TTL + Duration::from_millis(1)).is_none());
    }

    #[test]
    fn expired_history_is_replaced_not_reused() {
        let store = store(4, true);
        let t0 = Instant::now();
        let old = store.get_or_create_at("a", t0);
        old.push(CapturedEntry::new("GET", "/old"));

        let fresh = store.get_or_create_at("a", t0 + TTL + Duration::from_secs(1));
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert!(fresh.is_empty());
        assert_eq!(store.stats().evicted_by_expiry, 1);
    }

    #[test]
    fn expired_tenants_make_room_before_lru_eviction() {
        let store = store(2, true);
        let t0 = Instant::now();
        store.get_or_create_at("old", t0);
        store.get_or_create_at("live", t0 + TTL);
        store.get_or_create_at("new", t0 + TTL + Duration::from_secs(1));

        let stats = store.stats();
        assert_eq!(stats.evicted_by_capacity, 0);
        assert_eq!(stats.evicted_by_expiry, 1);
        assert!(store.get_at("live", t0 + TTL + Duration::from_secs(2)).is_some());
    }

    #[test]
    fn touch_refreshes_and_reports_absence() {
        let store = store(4, true);
        let t0 = Instant::now();
        assert!(!store.touch_at("a", t0));
        store.get_or_create_at("a", t0);
        assert!(store.touch_at("a", t0 + TTL));
        assert!(store.get_at("a", t0 + TTL * 2).is_some());
        assert!(!store.touch_at("a", t0 + TTL * 4));
    }

    #[test]
    fn purge_stops_at_first_live_tenant() {
        let store = store(8, true);
        let t0 = Instant::now();
        store.get_or_create_at("a", t0);
        store.get_or_create_at("b", t0 + Duration::from_secs(10));
        store.get_or_create_at("c", t0 + TTL);

        assert_eq!(store.purge_expired_at(t0 + TTL + Duration::from_secs(5)), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.purge_expired_at(t0 + TTL * 3), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn append_pushes_into_tenant_history() {
        let store = store(4, true);
        store.append("k", CapturedEntry::new("POST", "/endpoint/k"));
        store.append("k", CapturedEntry::new("PUT", "/endpoint/k"));

        let history = store.get("k").unwrap();
        let methods: Vec<_> = history.snapshot().into_iter().map(|e| e.method).collect();
        assert_eq!(methods, vec!["PUT", "POST"]);
    }

    #[tokio::test]
    async fn sweeper_stops_when_store_dropped() {
        let store = Arc::new(store(4, true));
        let handle = spawn_sweeper(&store, Duration::from_millis(5));
        drop(store);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper should exit")
            .unwrap();
    }
}
