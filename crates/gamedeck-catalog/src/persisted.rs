//! Persisted tier: a single namespaced slot holding every cached catalog
//!
//! The slot contains a JSON object mapping key strings to
//! [`CacheEntry`] values. Every write is a read-modify-write of that whole
//! object; writers inside one process are serialized by an async lock.

use crate::entry::CacheEntry;
use crate::error::{CatalogError, CatalogResult};
use crate::key::CatalogKey;
use crate::store::KeyValueStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{trace, warn};

/// Slot name holding the catalog map
pub const DEFAULT_NAMESPACE: &str = "gamedeck:catalog-cache";

type EntryMap = BTreeMap<String, CacheEntry>;

/// Catalog map stored in one [`KeyValueStore`] slot
pub struct PersistedTier {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    write_lock: Mutex<()>,
}

impl PersistedTier {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_namespace(store, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Read the whole map; a missing slot is an empty map
    pub async fn load_map(&self) -> CatalogResult<EntryMap> {
        match self.store.get(&self.namespace).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Map used as the base of a write. A corrupted slot is replaced rather
    /// than blocking all future writes.
    async fn load_map_for_write(&self) -> CatalogResult<EntryMap> {
        match self.load_map().await {
            Ok(map) => Ok(map),
            Err(CatalogError::Json(e)) => {
                warn!("Discarding corrupted catalog slot {}: {e}", self.namespace);
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn save_map(&self, map: &EntryMap) -> CatalogResult<()> {
        let raw = serde_json::to_string(map)?;
        trace!("Saving {} entries ({} bytes)", map.len(), raw.len());
        self.store.set(&self.namespace, &raw).await
    }

    /// Raw lookup; freshness is the caller's concern
    pub async fn get(&self, key: &CatalogKey) -> CatalogResult<Option<CacheEntry>> {
        Ok(self.load_map().await?.remove(key.as_cache_key()))
    }

    /// Overwrite one key's slot
    pub async fn put(&self, key: &CatalogKey, entry: &CacheEntry) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_map_for_write().await?;
        map.insert(key.as_cache_key().to_string(), entry.clone());
        self.save_map(&map).await
    }

    /// Overwrite one key's slot and drop every other entry older than
    /// `expiry`. Returns how many entries were dropped.
    pub async fn put_and_sweep(
        &self,
        key: &CatalogKey,
        entry: &CacheEntry,
        expiry: Duration,
        now_ms: u64,
    ) -> CatalogResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_map_for_write().await?;
        let before = map.len();
        map.retain(|_, e| e.is_fresh_at(now_ms, expiry));
        let swept = before - map.len();
        map.insert(key.as_cache_key().to_string(), entry.clone());
        self.save_map(&map).await?;
        Ok(swept)
    }

    pub async fn remove(&self, key: &CatalogKey) -> CatalogResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_map_for_write().await?;
        let removed = map.remove(key.as_cache_key()).is_some();
        if removed {
            self.save_map(&map).await?;
        }
        Ok(removed)
    }

    /// Drop entries older than `expiry`. Returns how many were dropped.
    pub async fn sweep(&self, expiry: Duration, now_ms: u64) -> CatalogResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load_map_for_write().await?;
        let before = map.len();
        map.retain(|_, e| e.is_fresh_at(now_ms, expiry));
        let swept = before - map.len();
        if swept > 0 {
            self.save_map(&map).await?;
        }
        Ok(swept)
    }

    pub async fn clear(&self) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&self.namespace).await?;
        Ok(())
    }

    pub async fn len(&self) -> CatalogResult<usize> {
        Ok(self.load_map().await?.len())
    }

    pub async fn is_empty(&self) -> CatalogResult<bool> {
        Ok(self.len().await? == 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{CatalogEntry, CatalogScope, DeviceClass};
    use crate::store::MemoryStore;

    fn key(device: DeviceClass) -> CatalogKey {
        CatalogKey::new(CatalogScope::Slot, device, 48)
    }

    fn entry(timestamp: u64) -> CacheEntry {
        let games = vec![CatalogEntry::new("1", "a", "p")];
        CacheEntry::from_games(games, 48).with_timestamp(timestamp)
    }

    #[tokio::test]
    async fn test_put_get_isolated_by_key() {
        let tier = PersistedTier::new(Arc::new(MemoryStore::new()));
        let mobile = key(DeviceClass::Mobile);
        tier.put(&mobile, &entry(1)).await.unwrap();

        assert_eq!(tier.get(&mobile).await.unwrap(), Some(entry(1)));
        assert_eq!(tier.get(&key(DeviceClass::Desktop)).await.unwrap(), None);
        assert_eq!(tier.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_all_keys_share_one_slot() {
        let store = Arc::new(MemoryStore::new());
        let tier = PersistedTier::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
        let (mobile, tablet) = (key(DeviceClass::Mobile), key(DeviceClass::Tablet));
        tier.put(&mobile, &entry(1)).await.unwrap();
        tier.put(&tablet, &entry(2)).await.unwrap();

        assert_eq!(store.len(), 1);
        let raw = store.get(DEFAULT_NAMESPACE).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["games:slot:mobile:48"]["timestamp"], 1);
        assert_eq!(value["games:slot:tablet:48"]["timestamp"], 2);
    }

    #[tokio::test]
    async fn test_corrupted_slot_reads_fail_and_writes_heal() {
        let store = Arc::new(MemoryStore::new());
        store.set(DEFAULT_NAMESPACE, "not json").await.unwrap();
        let tier = PersistedTier::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
        let mobile = key(DeviceClass::Mobile);

        assert!(tier.get(&mobile).await.is_err());

        tier.put(&mobile, &entry(5)).await.unwrap();
        assert_eq!(tier.get(&mobile).await.unwrap(), Some(entry(5)));
    }

    #[tokio::test]
    async fn test_sweep_drops_only_expired() {
        let tier = PersistedTier::new(Arc::new(MemoryStore::new()));
        let expiry = Duration::from_secs(60);
        let stale = key(DeviceClass::Mobile);
        let fresh = key(DeviceClass::Desktop);
        tier.put(&stale, &entry(0)).await.unwrap();
        tier.put(&fresh, &entry(100_000)).await.unwrap();

        let swept = tier.sweep(expiry, 120_000).await.unwrap();
        assert_eq!(swept, 1);
        assert_eq!(tier.get(&stale).await.unwrap(), None);
        assert!(tier.get(&fresh).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_put_and_sweep() {
        let tier = PersistedTier::new(Arc::new(MemoryStore::new()));
        let expiry = Duration::from_secs(60);
        let (stale, fresh) = (key(DeviceClass::Mobile), key(DeviceClass::Tablet));
        tier.put(&stale, &entry(0)).await.unwrap();

        let swept = tier
            .put_and_sweep(&fresh, &entry(120_000), expiry, 120_000)
            .await
            .unwrap();
        assert_eq!(swept, 1);
        assert_eq!(tier.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let tier = PersistedTier::new(Arc::new(MemoryStore::new()));
        let mobile = key(DeviceClass::Mobile);
        let tablet = key(DeviceClass::Tablet);
        tier.put(&mobile, &entry(1)).await.unwrap();
        tier.put(&tablet, &entry(1)).await.unwrap();

        assert!(tier.remove(&mobile).await.unwrap());
        assert!(!tier.remove(&mobile).await.unwrap());

        tier.clear().await.unwrap();
        assert!(tier.is_empty().await.unwrap());
    }
}
