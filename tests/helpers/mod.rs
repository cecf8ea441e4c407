#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use webhook_preview::capture::CaptureStore;
use webhook_preview::config::{Config, StoreConfig};
use webhook_preview::PreviewEngine;

pub fn setup_store(ring_capacity: usize, max_tenants: usize, ttl: Duration) -> Arc<CaptureStore> {
    Arc::new(CaptureStore::new(StoreConfig {
        ring_capacity,
        max_tenants,
        ttl,
        ..StoreConfig::default()
    }))
}

pub fn setup_engine(store: StoreConfig, max_body_bytes: usize) -> PreviewEngine {
    let mut config = Config::default();
    config.server.http_base_url = "http://preview.test".to_string();
    config.server.max_body_bytes = max_body_bytes;
    config.store = store;
    PreviewEngine::new(&config).expect("engine should build")
}

/// Per-operation latency for store benchmarks. Each timed call is one sample;
/// the report closes with the store's tenant and eviction counters.
pub struct StoreBench {
    op: &'static str,
    started: Instant,
    samples: Vec<Duration>,
}

impl StoreBench {
    pub fn new(op: &'static str, expected: usize) -> Self {
        Self {
            op,
            started: Instant::now(),
            samples: Vec::with_capacity(expected),
        }
    }

    pub fn time<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let out = f();
        self.samples.push(start.elapsed());
        out
    }

    fn percentile(&self, pct: usize) -> u128 {
        let idx = (self.samples.len() * pct / 100).min(self.samples.len().saturating_sub(1));
        self.samples.get(idx).map_or(0, |d| d.as_micros())
    }

    pub fn report(mut self, store: &CaptureStore) {
        let elapsed = self.started.elapsed();
        self.samples.sort_unstable();
        let stats = store.stats();

        println!(
            "\n[{}] {} ops in {:.2?} ({:.0} ops/sec)",
            self.op,
            self.samples.len(),
            elapsed,
            self.samples.len() as f64 / elapsed.as_secs_f64()
        );
        println!(
            "  latency us: p50={} p95={} p99={} max={}",
            self.percentile(50),
            self.percentile(95),
            self.percentile(99),
            self.samples.last().map_or(0, |d| d.as_micros())
        );
        println!(
            "  tenants={}/{} evicted: capacity={} expiry={}",
            stats.tenants, stats.max_tenants, stats.evicted_by_capacity, stats.evicted_by_expiry
        );
    }
}
