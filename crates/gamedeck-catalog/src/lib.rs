//! Cached game catalog for casino front-ends
//!
//! This crate provides:
//! - A remote fetcher that pulls a whole catalog in one bulk request
//! - A two-tier cache (memory + persisted key-value store) keyed by scope,
//!   device class and page size
//! - A pure filter/paginate engine
//! - A per-consumer browser that debounces filter changes and publishes
//!   view snapshots
//!
//! # Example
//!
//! ```no_run
//! use gamedeck_catalog::{CatalogConfig, CatalogScope, CatalogService, DeviceClass};
//! use std::sync::Arc;
//!
//! # async fn example() -> gamedeck_catalog::CatalogResult<()> {
//! let service = Arc::new(CatalogService::open(CatalogConfig::new()).await?);
//!
//! let browser = service.browser(CatalogScope::Slot, DeviceClass::from_viewport_width(390));
//! browser.load().await;
//! browser.set_provider(Some("NetEnt"));
//! browser.recompute_now();
//!
//! browser.render(|view| {
//!     println!("page {}/{}: {} games", view.page, view.total_pages, view.games.len());
//! });
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod debounce;
pub mod entry;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod key;
pub mod memory_tier;
pub mod model;
pub mod persisted;
pub mod service;
pub mod stats;
pub mod store;
pub mod two_tier;

pub use browser::{CatalogBrowser, CatalogView};
pub use config::CatalogConfig;
pub use entry::CacheEntry;
pub use error::{CatalogError, CatalogResult};
pub use fetcher::{CatalogResponse, CatalogSource, HttpCatalogSource};
pub use filter::{FilterState, GameTypeTags, PageSlice, count_matches, paginate};
pub use key::CatalogKey;
pub use model::{CatalogEntry, CatalogScope, DeviceClass};
pub use service::CatalogService;
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use two_tier::TwoTierCache;

/// Common imports
pub mod prelude {
    pub use crate::{
        CacheEntry, CatalogBrowser, CatalogConfig, CatalogError, CatalogKey, CatalogResult,
        CatalogScope, CatalogService, CatalogView, DeviceClass, FilterState, PageSlice,
    };
}
