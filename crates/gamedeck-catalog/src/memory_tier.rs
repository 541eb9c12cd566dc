//! Process-local catalog tier

use crate::entry::CacheEntry;
use crate::key::CatalogKey;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Concurrent map from key to shared entry
#[derive(Debug, Default)]
pub struct MemoryTier {
    entries: DashMap<CatalogKey, Arc<CacheEntry>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw lookup; freshness is the caller's concern
    pub fn get(&self, key: &CatalogKey) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).map(|e| Arc::clone(e.value()))
    }

    pub fn put(&self, key: CatalogKey, entry: Arc<CacheEntry>) {
        self.entries.insert(key, entry);
    }

    pub fn remove(&self, key: &CatalogKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drop entries older than `expiry`, returning how many were dropped
    pub fn sweep(&self, expiry: Duration, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_fresh_at(now_ms, expiry));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
