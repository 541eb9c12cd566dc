//! Application-root catalog service
//!
//! Owns the cache and the remote source. Consumers hold it by `Arc` and go
//! through [`CatalogService::load`] for every catalog they need.

use crate::browser::CatalogBrowser;
use crate::config::CatalogConfig;
use crate::entry::CacheEntry;
use crate::error::CatalogResult;
use crate::fetcher::{CatalogSource, HttpCatalogSource};
use crate::filter::{FilterState, PageSlice, paginate};
use crate::key::CatalogKey;
use crate::model::{CatalogScope, DeviceClass};
use crate::two_tier::TwoTierCache;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Cache-first catalog loader
pub struct CatalogService {
    config: CatalogConfig,
    cache: TwoTierCache,
    source: Arc<dyn CatalogSource>,
    /// Per-key locks used when fetch coalescing is enabled
    inflight: DashMap<CatalogKey, Arc<Mutex<()>>>,
}

impl CatalogService {
    pub fn new(
        config: CatalogConfig,
        cache: TwoTierCache,
        source: Arc<dyn CatalogSource>,
    ) -> CatalogResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache,
            source,
            inflight: DashMap::new(),
        })
    }

    /// File-backed cache in the configured directory plus the HTTP source
    pub async fn open(config: CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;
        let cache = TwoTierCache::open(&config).await?;
        let source = Arc::new(HttpCatalogSource::new(&config)?);
        Self::new(config, cache, source)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn cache(&self) -> &TwoTierCache {
        &self.cache
    }

    pub fn key(&self, scope: CatalogScope, device: DeviceClass) -> CatalogKey {
        CatalogKey::new(scope, device, self.config.page_size)
    }

    /// Return the cached catalog, fetching and caching it on a miss
    pub async fn load(
        &self,
        scope: CatalogScope,
        device: DeviceClass,
    ) -> CatalogResult<Arc<CacheEntry>> {
        let key = self.key(scope, device);

        if let Some(entry) = self.cache.read(&key).await {
            return Ok(entry);
        }

        if !self.config.coalesce_fetches {
            return self.fetch_and_store(&key).await;
        }

        let lock = Arc::clone(self.inflight.entry(key.clone()).or_default().value());
        let result = {
            let _guard = lock.lock().await;
            if let Some(entry) = self.cache.read(&key).await {
                debug!("Served {key} from a concurrent fetch");
                self.cache.stats().record_coalesced();
                Ok(entry)
            } else {
                self.fetch_and_store(&key).await
            }
        };

        // Only the map and this call still hold the lock
        self.inflight
            .remove_if(&key, |_, l| Arc::strong_count(l) <= 2);
        result
    }

    /// Fetch from the source regardless of the cache, then cache the result
    pub async fn refresh(
        &self,
        scope: CatalogScope,
        device: DeviceClass,
    ) -> CatalogResult<Arc<CacheEntry>> {
        self.fetch_and_store(&self.key(scope, device)).await
    }

    async fn fetch_and_store(&self, key: &CatalogKey) -> CatalogResult<Arc<CacheEntry>> {
        self.cache.stats().record_fetch();
        match self.source.fetch(key.scope, key.device).await {
            Ok(games) => Ok(self.cache.write_games(key, games).await),
            Err(e) => {
                warn!("Catalog fetch failed for {key}: {e}");
                self.cache.stats().record_fetch_failure();
                Err(e)
            }
        }
    }

    /// Load a catalog and cut one filtered page out of it
    pub async fn page(
        &self,
        scope: CatalogScope,
        device: DeviceClass,
        filter: &FilterState,
    ) -> CatalogResult<PageSlice> {
        let entry = self.load(scope, device).await?;
        paginate(
            &entry.games,
            filter,
            device,
            self.config.page_size,
            &self.config.game_type_tags,
        )
    }

    /// Consumer bound to this service
    pub fn browser(self: &Arc<Self>, scope: CatalogScope, device: DeviceClass) -> CatalogBrowser {
        CatalogBrowser::new(Arc::clone(self), scope, device)
    }
}
