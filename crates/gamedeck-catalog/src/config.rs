//! Catalog pipeline configuration
//!
//! All knobs have sensible defaults; a TOML file can override any subset of
//! them.

use crate::error::{CatalogError, CatalogResult};
use crate::filter::GameTypeTags;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default catalog endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/games";

/// Default visible page size
pub const DEFAULT_PAGE_SIZE: usize = 48;

/// Page size sentinel sent upstream to request the whole catalog
pub const DEFAULT_FETCH_LIMIT: usize = 10_000;

/// Default cache entry lifetime (60 minutes)
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// Default delay before a filter pass runs
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Configuration for the catalog service and its consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog endpoint queried with a single bulk GET
    pub endpoint: Url,
    /// Entries per visible page
    pub page_size: usize,
    /// Page size requested from the endpoint
    pub fetch_limit: usize,
    /// Cache entry lifetime in seconds
    pub expiry_secs: u64,
    /// Filter recomputation delay in milliseconds
    pub debounce_ms: u64,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Coalesce concurrent fetches of the same key into one request
    pub coalesce_fetches: bool,
    /// Purge expired entries from both tiers on every write
    pub sweep_on_write: bool,
    /// Directory for the persisted tier (None for the platform cache dir)
    pub cache_dir: Option<PathBuf>,
    /// Game type to tag mapping used by the type filter. Entries read from a
    /// config file are merged over the built-in mapping.
    #[serde(deserialize_with = "merge_game_type_tags")]
    pub game_type_tags: GameTypeTags,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            page_size: DEFAULT_PAGE_SIZE,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            expiry_secs: DEFAULT_EXPIRY.as_secs(),
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            request_timeout_secs: 30,
            user_agent: concat!("gamedeck/", env!("CARGO_PKG_VERSION")).to_string(),
            coalesce_fetches: false,
            sweep_on_write: true,
            cache_dir: None,
            game_type_tags: GameTypeTags::default(),
        }
    }
}

fn merge_game_type_tags<'de, D>(deserializer: D) -> Result<GameTypeTags, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, String>::deserialize(deserializer)?;
    let mut tags = GameTypeTags::default();
    for (game_type, tag) in overrides {
        tags = tags.with_mapping(game_type, tag);
    }
    Ok(tags)
}

#[allow(clippy::expect_used)]
fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

impl CatalogConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML file; missing keys keep their defaults
    pub fn from_toml_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the catalog endpoint
    pub fn with_endpoint(mut self, endpoint: &str) -> CatalogResult<Self> {
        self.endpoint = Url::parse(endpoint)?;
        Ok(self)
    }

    /// Set the visible page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the cache entry lifetime
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry_secs = expiry.as_secs();
        self
    }

    /// Set the filter recomputation delay
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = delay.as_millis() as u64;
        self
    }

    /// Enable or disable fetch coalescing
    pub fn with_coalesced_fetches(mut self, enabled: bool) -> Self {
        self.coalesce_fetches = enabled;
        self
    }

    /// Enable or disable expired-entry sweeping on write
    pub fn with_sweep_on_write(mut self, enabled: bool) -> Self {
        self.sweep_on_write = enabled;
        self
    }

    /// Set the persisted tier directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve the persisted tier directory
    ///
    /// Returns a path like:
    /// - Linux: `~/.cache/gamedeck`
    /// - macOS: `~/Library/Caches/gamedeck`
    /// - Windows: `C:\Users\{user}\AppData\Local\gamedeck`
    pub fn resolve_cache_dir(&self) -> CatalogResult<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        dirs::cache_dir()
            .ok_or(CatalogError::CacheDirectoryNotFound)
            .map(|dir| dir.join("gamedeck"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> CatalogResult<()> {
        if self.page_size == 0 {
            return Err(CatalogError::InvalidConfiguration(
                "page_size must be greater than 0".to_string(),
            ));
        }

        if self.fetch_limit < self.page_size {
            return Err(CatalogError::InvalidConfiguration(
                "fetch_limit must be at least page_size".to_string(),
            ));
        }

        if self.expiry_secs == 0 {
            return Err(CatalogError::InvalidConfiguration(
                "expiry_secs must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(CatalogError::InvalidConfiguration(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidConfiguration(format!(
                "unsupported endpoint scheme: {}",
                self.endpoint.scheme()
            )));
        }

        Ok(())
    }
}
