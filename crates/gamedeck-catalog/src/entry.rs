//! Cached catalog snapshot stored in both tiers

use crate::filter::{distinct_providers, total_pages};
use crate::model::CatalogEntry;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch
pub fn current_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One cached catalog.
///
/// Serialized as `{games, providers, totalPages, timestamp}` so the persisted
/// map stays readable by other consumers of the same store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub games: Vec<CatalogEntry>,
    /// Distinct providers, derived once per fetch
    pub providers: Vec<String>,
    pub total_pages: usize,
    /// Write time in milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl CacheEntry {
    /// Build an entry from a fresh fetch, stamped with the current time
    pub fn from_games(games: Vec<CatalogEntry>, page_size: usize) -> Self {
        let providers = distinct_providers(&games);
        let total_pages = total_pages(games.len(), page_size);
        Self {
            games,
            providers,
            total_pages,
            timestamp: current_time_ms(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn age_at(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.timestamp))
    }

    /// `now - timestamp < expiry`
    pub fn is_fresh_at(&self, now_ms: u64, expiry: Duration) -> bool {
        self.age_at(now_ms) < expiry
    }

    pub fn is_fresh(&self, expiry: Duration) -> bool {
        self.is_fresh_at(current_time_ms(), expiry)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_games_derives_metadata() {
        let games = vec![
            CatalogEntry::new("1", "a", "NetEnt"),
            CatalogEntry::new("2", "b", "Evolution"),
            CatalogEntry::new("3", "c", "NetEnt"),
        ];
        let entry = CacheEntry::from_games(games, 2);
        assert_eq!(entry.providers, vec!["Evolution", "NetEnt"]);
        assert_eq!(entry.total_pages, 2);
        assert!(entry.timestamp > 0);
    }

    #[test]
    fn test_freshness_boundary() {
        let expiry = Duration::from_secs(60);
        let entry = CacheEntry::from_games(vec![], 48).with_timestamp(1_000);

        assert!(entry.is_fresh_at(1_000, expiry));
        assert!(entry.is_fresh_at(60_999, expiry));
        assert!(!entry.is_fresh_at(61_000, expiry));
        // Clock skew: a timestamp in the future counts as age zero
        assert!(entry.is_fresh_at(0, expiry));
    }

    #[test]
    fn test_wire_shape() {
        let entry = CacheEntry::from_games(vec![CatalogEntry::new("1", "a", "p")], 48)
            .with_timestamp(42);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["totalPages"], 1);
        assert_eq!(value["timestamp"], 42);
        assert_eq!(value["providers"][0], "p");
        assert_eq!(value["games"][0]["id"], "1");
    }
}
