//! Two-tier catalog cache
//!
//! Both tiers share the same keys. Reads consult the persisted tier first and
//! fall back to memory; a fresh hit in either tier is copied into the other.
//! Writes go through to both tiers with the current timestamp.
//!
//! The persisted tier is best-effort: its failures are logged and counted,
//! then treated as a miss on read or a skipped write. They never reach the
//! caller.

use crate::config::CatalogConfig;
use crate::entry::{CacheEntry, current_time_ms};
use crate::error::CatalogResult;
use crate::key::CatalogKey;
use crate::memory_tier::MemoryTier;
use crate::model::CatalogEntry;
use crate::persisted::PersistedTier;
use crate::stats::CacheStats;
use crate::store::{FileStore, KeyValueStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Memory + persisted cache with a fixed entry lifetime
pub struct TwoTierCache {
    memory: MemoryTier,
    persisted: PersistedTier,
    expiry: Duration,
    sweep_on_write: bool,
    stats: CacheStats,
}

impl TwoTierCache {
    /// Create a cache over `store` with the given entry lifetime
    pub fn new(store: Arc<dyn KeyValueStore>, expiry: Duration) -> Self {
        Self {
            memory: MemoryTier::new(),
            persisted: PersistedTier::new(store),
            expiry,
            sweep_on_write: true,
            stats: CacheStats::new(),
        }
    }

    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &CatalogConfig) -> Self {
        Self::new(store, config.expiry()).with_sweep_on_write(config.sweep_on_write)
    }

    /// Open a file-backed cache in the configured cache directory
    pub async fn open(config: &CatalogConfig) -> CatalogResult<Self> {
        let dir = config.resolve_cache_dir()?;
        let store = FileStore::open(&dir).await?;
        Ok(Self::from_config(Arc::new(store), config))
    }

    pub fn with_sweep_on_write(mut self, enabled: bool) -> Self {
        self.sweep_on_write = enabled;
        self
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }

    pub fn persisted(&self) -> &PersistedTier {
        &self.persisted
    }

    /// Look up a fresh entry for `key`
    pub async fn read(&self, key: &CatalogKey) -> Option<Arc<CacheEntry>> {
        self.read_at(key, current_time_ms()).await
    }

    /// Look up an entry that is fresh at `now_ms`
    pub async fn read_at(&self, key: &CatalogKey, now_ms: u64) -> Option<Arc<CacheEntry>> {
        match self.persisted.get(key).await {
            Ok(Some(entry)) if entry.is_fresh_at(now_ms, self.expiry) => {
                debug!("Persisted cache hit: {key}");
                self.stats.record_persisted_hit();
                let entry = Arc::new(entry);
                self.memory.put(key.clone(), Arc::clone(&entry));
                return Some(entry);
            }
            Ok(Some(_)) => trace!("Persisted entry expired: {key}"),
            Ok(None) => {}
            Err(e) => {
                warn!("Persisted cache read failed for {key}: {e}");
                self.stats.record_store_failure();
            }
        }

        if let Some(entry) = self.memory.get(key)
            && entry.is_fresh_at(now_ms, self.expiry)
        {
            debug!("Memory cache hit: {key}");
            self.stats.record_memory_hit();
            if let Err(e) = self.persisted.put(key, &entry).await {
                warn!("Persisted cache backfill failed for {key}: {e}");
                self.stats.record_store_failure();
            }
            return Some(entry);
        }

        debug!("Cache miss: {key}");
        self.stats.record_miss();
        None
    }

    /// Store a freshly fetched catalog in both tiers, stamped with the
    /// current time
    pub async fn write(
        &self,
        key: &CatalogKey,
        games: Vec<CatalogEntry>,
        providers: Vec<String>,
        total_pages: usize,
    ) -> Arc<CacheEntry> {
        let entry = CacheEntry {
            games,
            providers,
            total_pages,
            timestamp: current_time_ms(),
        };
        self.insert(key, entry).await
    }

    /// Store a fetched game list, deriving providers and page count from it
    pub async fn write_games(
        &self,
        key: &CatalogKey,
        games: Vec<CatalogEntry>,
    ) -> Arc<CacheEntry> {
        let entry = CacheEntry::from_games(games, key.page_size);
        self.insert(key, entry).await
    }

    /// Store `entry` as-is in both tiers
    pub async fn insert(&self, key: &CatalogKey, entry: CacheEntry) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        let now_ms = current_time_ms();

        let persisted = if self.sweep_on_write {
            let swept = self.memory.sweep(self.expiry, now_ms);
            self.memory.put(key.clone(), Arc::clone(&entry));
            self.persisted
                .put_and_sweep(key, &entry, self.expiry, now_ms)
                .await
                .map(|persisted_swept| swept + persisted_swept)
        } else {
            self.memory.put(key.clone(), Arc::clone(&entry));
            self.persisted.put(key, &entry).await.map(|()| 0)
        };

        match persisted {
            Ok(swept) => {
                if swept > 0 {
                    debug!("Swept {swept} expired cache entries");
                    self.stats.record_swept(swept);
                }
            }
            Err(e) => {
                warn!("Persisted cache write failed for {key}: {e}");
                self.stats.record_store_failure();
            }
        }

        self.stats.record_write();
        trace!(
            "Cached {} games for {key} ({} pages)",
            entry.games.len(),
            entry.total_pages
        );
        entry
    }

    /// Remove one key from both tiers
    pub async fn remove(&self, key: &CatalogKey) -> CatalogResult<bool> {
        let in_memory = self.memory.remove(key);
        let persisted = self.persisted.remove(key).await?;
        Ok(in_memory || persisted)
    }

    /// Remove every entry from both tiers
    pub async fn clear(&self) -> CatalogResult<()> {
        self.memory.clear();
        self.persisted.clear().await?;
        debug!("Cleared catalog cache");
        Ok(())
    }

    /// Purge expired entries from both tiers.
    ///
    /// Returns the number of entries removed, counted per tier.
    pub async fn sweep_expired(&self) -> CatalogResult<usize> {
        let now_ms = current_time_ms();
        let swept = self.memory.sweep(self.expiry, now_ms)
            + self.persisted.sweep(self.expiry, now_ms).await?;
        self.stats.record_swept(swept);
        debug!("Swept {swept} expired cache entries");
        Ok(swept)
    }
}
