//! Cache statistics tracking
//!
//! Counters are shared atomics so a clone of [`CacheStats`] observes the same
//! numbers as the cache that owns it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Hit/miss and fetch counters for the two-tier catalog cache
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Reads answered by the persisted tier
    persisted_hits: Arc<AtomicU64>,
    /// Reads answered by the in-memory tier
    memory_hits: Arc<AtomicU64>,
    /// Reads answered by neither tier
    misses: Arc<AtomicU64>,
    writes: Arc<AtomicU64>,
    /// Persisted tier reads/writes that failed and were absorbed
    store_failures: Arc<AtomicU64>,
    fetches: Arc<AtomicU64>,
    fetch_failures: Arc<AtomicU64>,
    /// Loads served by waiting on another caller's fetch
    coalesced: Arc<AtomicU64>,
    /// Expired entries removed by sweeps
    swept: Arc<AtomicU64>,
    start_time: Instant,
}

/// Snapshot of cache statistics at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatsSnapshot {
    pub persisted_hits: u64,
    pub memory_hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub store_failures: u64,
    pub fetches: u64,
    pub fetch_failures: u64,
    pub coalesced: u64,
    pub swept: u64,
    /// Hit rate as a percentage (0.0 to 100.0)
    pub hit_rate: f64,
    pub uptime_seconds: u64,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStats {
    pub fn new() -> Self {
        Self {
            persisted_hits: Arc::new(AtomicU64::new(0)),
            memory_hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            writes: Arc::new(AtomicU64::new(0)),
            store_failures: Arc::new(AtomicU64::new(0)),
            fetches: Arc::new(AtomicU64::new(0)),
            fetch_failures: Arc::new(AtomicU64::new(0)),
            coalesced: Arc::new(AtomicU64::new(0)),
            swept: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn record_persisted_hit(&self) {
        self.persisted_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_swept(&self, count: usize) {
        self.swept.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.persisted_hits.load(Ordering::Relaxed) + self.memory_hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Hit rate as a percentage (0.0 to 100.0)
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();

        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.persisted_hits,
            &self.memory_hits,
            &self.misses,
            &self.writes,
            &self.store_failures,
            &self.fetches,
            &self.fetch_failures,
            &self.coalesced,
            &self.swept,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            persisted_hits: self.persisted_hits.load(Ordering::Relaxed),
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            misses: self.misses(),
            writes: self.writes.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            fetches: self.fetches(),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
            hit_rate: self.hit_rate(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}
