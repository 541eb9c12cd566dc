//! Composite cache key isolating catalogs by scope, device class and page size

use crate::model::{CatalogScope, DeviceClass};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Key for one cached catalog.
///
/// A mobile consumer never reads a desktop entry because the device class is
/// part of the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogKey {
    pub scope: CatalogScope,
    pub device: DeviceClass,
    pub page_size: usize,
    #[serde(skip)]
    cached_key: OnceLock<String>,
}

// Manual implementations to exclude the OnceLock field from Hash and PartialEq
impl PartialEq for CatalogKey {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope
            && self.device == other.device
            && self.page_size == other.page_size
    }
}

impl Eq for CatalogKey {}

impl std::hash::Hash for CatalogKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.scope.hash(state);
        self.device.hash(state);
        self.page_size.hash(state);
    }
}

impl CatalogKey {
    pub fn new(scope: CatalogScope, device: DeviceClass, page_size: usize) -> Self {
        Self {
            scope,
            device,
            page_size,
            cached_key: OnceLock::new(),
        }
    }

    /// String form used as the slot name in the persisted map
    pub fn as_cache_key(&self) -> &str {
        self.cached_key.get_or_init(|| {
            format!("games:{}:{}:{}", self.scope, self.device, self.page_size)
        })
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cache_key())
    }
}
