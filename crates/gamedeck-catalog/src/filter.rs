//! Filter and paginate engine
//!
//! [`paginate`] is a pure function of the cached game list, the consumer's
//! [`FilterState`] and the device class. Filters apply in a fixed order:
//! game type tag, provider, device capability. The surviving entries keep
//! their fetch order and are sliced into pages.

use crate::error::{CatalogError, CatalogResult};
use crate::model::{CatalogEntry, DeviceClass};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Game type value that disables the type filter
pub const ALL_GAME_TYPES: &str = "all";

/// Mapping from a selectable game type to the tag entries must carry.
///
/// Types without an explicit mapping use the type string itself as the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameTypeTags(BTreeMap<String, String>);

impl Default for GameTypeTags {
    fn default() -> Self {
        let map = [
            ("slot", "slots"),
            ("live", "live-casino"),
            ("table", "table-games"),
            ("jackpot", "jackpot"),
            ("crash", "crash"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self(map)
    }
}

impl GameTypeTags {
    /// An empty mapping: every game type is its own tag
    pub fn identity() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with_mapping(mut self, game_type: impl Into<String>, tag: impl Into<String>) -> Self {
        self.0.insert(game_type.into(), tag.into());
        self
    }

    pub fn tag_for<'a>(&'a self, game_type: &'a str) -> &'a str {
        self.0.get(game_type).map_or(game_type, String::as_str)
    }

    /// Selectable game types, "all" first
    pub fn game_types(&self) -> Vec<&str> {
        std::iter::once(ALL_GAME_TYPES)
            .chain(self.0.keys().map(String::as_str))
            .collect()
    }
}

/// Consumer-owned filter selections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub game_type: String,
    pub provider: Option<String>,
    /// 1-based page number
    pub page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            game_type: ALL_GAME_TYPES.to_string(),
            provider: None,
            page: 1,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game_type(mut self, game_type: impl Into<String>) -> Self {
        self.game_type = game_type.into();
        self
    }

    /// An empty provider string is the same as no provider filter
    pub fn with_provider(mut self, provider: Option<impl Into<String>>) -> Self {
        let provider: Option<String> = provider.map(Into::into);
        self.provider = provider.filter(|p| !p.is_empty());
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn is_all_types(&self) -> bool {
        self.game_type.is_empty() || self.game_type.eq_ignore_ascii_case(ALL_GAME_TYPES)
    }

    fn selected_provider(&self) -> Option<&str> {
        self.provider.as_deref().filter(|p| !p.is_empty())
    }
}

/// One page of filtered entries
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageSlice {
    pub games: Vec<CatalogEntry>,
    /// Effective page; 1 when the requested page was out of range
    pub page: usize,
    pub total_pages: usize,
    /// Entries matching the filters across all pages
    pub total_matches: usize,
}

impl PageSlice {
    /// Whether the requested page was reset to the first page
    pub fn was_reset(&self, requested: usize) -> bool {
        self.page != requested
    }
}

/// `max(1, ceil(count / page_size))`
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}

/// Sorted, de-duplicated provider names
pub fn distinct_providers(games: &[CatalogEntry]) -> Vec<String> {
    games
        .iter()
        .map(|g| g.provider.as_str())
        .filter(|p| !p.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn matching<'a>(
    games: &'a [CatalogEntry],
    filter: &'a FilterState,
    device: DeviceClass,
    tags: &'a GameTypeTags,
) -> impl Iterator<Item = &'a CatalogEntry> {
    let type_tag = (!filter.is_all_types()).then(|| tags.tag_for(&filter.game_type));
    let provider = filter.selected_provider();

    games
        .iter()
        .filter(move |g| type_tag.is_none_or(|tag| g.has_tag(tag)))
        .filter(move |g| provider.is_none_or(|p| g.provider == p))
        .filter(move |g| device.admits(g))
}

/// Number of entries passing the filters, regardless of page
pub fn count_matches(
    games: &[CatalogEntry],
    filter: &FilterState,
    device: DeviceClass,
    tags: &GameTypeTags,
) -> usize {
    matching(games, filter, device, tags).count()
}

/// Filter `games` and cut out the requested page.
///
/// A page number of 0 or beyond the last page resets to page 1 instead of
/// returning an empty slice.
pub fn paginate(
    games: &[CatalogEntry],
    filter: &FilterState,
    device: DeviceClass,
    page_size: usize,
    tags: &GameTypeTags,
) -> CatalogResult<PageSlice> {
    if page_size == 0 {
        return Err(CatalogError::InvalidPageSize);
    }

    let matched: Vec<&CatalogEntry> = matching(games, filter, device, tags).collect();

    let total_matches = matched.len();
    let total_pages = total_pages(total_matches, page_size);
    let page = if filter.page == 0 || filter.page > total_pages {
        1
    } else {
        filter.page
    };

    let games = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    Ok(PageSlice {
        games,
        page,
        total_pages,
        total_matches,
    })
}
