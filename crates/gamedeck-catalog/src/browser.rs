//! Per-consumer catalog browser
//!
//! A [`CatalogBrowser`] is what a screen mounts: it loads one catalog through
//! the service, owns the filter selections, and publishes a [`CatalogView`]
//! snapshot after every change. Filter changes are debounced; the pass that
//! finally runs always sees the most recently loaded data.

use crate::debounce::Debouncer;
use crate::entry::CacheEntry;
use crate::filter::{FilterState, count_matches, paginate, total_pages};
use crate::model::{CatalogEntry, CatalogScope, DeviceClass};
use crate::service::CatalogService;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Everything a consumer renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogView {
    /// Current page of filtered entries
    pub games: Vec<CatalogEntry>,
    pub providers: Vec<String>,
    pub game_type: String,
    pub provider: Option<String>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub is_loading: bool,
    pub is_error: bool,
}

#[derive(Debug, Default)]
struct BrowserState {
    data: Option<Arc<CacheEntry>>,
    filter: FilterState,
    page_games: Vec<CatalogEntry>,
    total_pages: usize,
    total_matches: usize,
    is_loading: bool,
    is_error: bool,
}

impl BrowserState {
    fn new() -> Self {
        Self {
            total_pages: 1,
            ..Self::default()
        }
    }

    fn view(&self) -> CatalogView {
        CatalogView {
            games: self.page_games.clone(),
            providers: self
                .data
                .as_ref()
                .map(|d| d.providers.clone())
                .unwrap_or_default(),
            game_type: self.filter.game_type.clone(),
            provider: self.filter.provider.clone(),
            page: self.filter.page,
            total_pages: self.total_pages,
            total_matches: self.total_matches,
            is_loading: self.is_loading,
            is_error: self.is_error,
        }
    }

    fn clear_results(&mut self) {
        self.page_games.clear();
        self.total_pages = 1;
        self.total_matches = 0;
    }
}

struct BrowserInner {
    service: Arc<CatalogService>,
    scope: CatalogScope,
    device: DeviceClass,
    state: Mutex<BrowserState>,
    view_tx: watch::Sender<CatalogView>,
}

impl BrowserInner {
    fn publish(&self, state: &BrowserState) {
        self.view_tx.send_replace(state.view());
    }

    fn recompute(&self) {
        let config = self.service.config();
        let mut state = self.state.lock();

        let Some(data) = state.data.clone() else {
            state.clear_results();
            self.publish(&state);
            return;
        };

        match paginate(
            &data.games,
            &state.filter,
            self.device,
            config.page_size,
            &config.game_type_tags,
        ) {
            Ok(slice) => {
                if slice.was_reset(state.filter.page) {
                    debug!(
                        "Page {} out of range, reset to {}",
                        state.filter.page, slice.page
                    );
                }
                state.filter.page = slice.page;
                state.total_pages = slice.total_pages;
                state.total_matches = slice.total_matches;
                state.page_games = slice.games;
            }
            Err(e) => {
                warn!("Filtering {} catalog failed: {e}", self.scope);
                state.clear_results();
            }
        }

        self.publish(&state);
    }
}

/// Filtered, paged view over one catalog
pub struct CatalogBrowser {
    inner: Arc<BrowserInner>,
    debouncer: Debouncer,
}

impl CatalogBrowser {
    pub fn new(service: Arc<CatalogService>, scope: CatalogScope, device: DeviceClass) -> Self {
        let state = BrowserState::new();
        let (view_tx, _) = watch::channel(state.view());
        let debouncer = Debouncer::new(service.config().debounce());
        Self {
            inner: Arc::new(BrowserInner {
                service,
                scope,
                device,
                state: Mutex::new(state),
                view_tx,
            }),
            debouncer,
        }
    }

    pub fn scope(&self) -> CatalogScope {
        self.inner.scope
    }

    pub fn device(&self) -> DeviceClass {
        self.inner.device
    }

    pub fn filter(&self) -> FilterState {
        self.inner.state.lock().filter.clone()
    }

    /// Load the catalog and schedule a filter pass.
    ///
    /// On failure the error flag is set and any previously loaded games and
    /// providers are dropped. Returns whether the load succeeded.
    pub async fn load(&self) -> bool {
        {
            let mut state = self.inner.state.lock();
            state.is_loading = true;
            self.inner.publish(&state);
        }

        let result = self
            .inner
            .service
            .load(self.inner.scope, self.inner.device)
            .await;

        let loaded = {
            let mut state = self.inner.state.lock();
            state.is_loading = false;
            let loaded = match result {
                Ok(entry) => {
                    state.data = Some(entry);
                    state.is_error = false;
                    true
                }
                Err(e) => {
                    warn!("Loading {} catalog failed: {e}", self.inner.scope);
                    state.data = None;
                    state.is_error = true;
                    state.clear_results();
                    false
                }
            };
            self.inner.publish(&state);
            loaded
        };

        if loaded {
            self.schedule_recompute();
        }
        loaded
    }

    /// Select a game type (`"all"` for no type filter) and go back to page 1
    pub fn set_game_type(&self, game_type: impl Into<String>) {
        self.update_filter(|filter| {
            filter.game_type = game_type.into();
            filter.page = 1;
        });
    }

    /// Select a provider (None or empty for all providers) and go back to page 1
    pub fn set_provider(&self, provider: Option<&str>) {
        self.update_filter(|filter| {
            *filter = std::mem::take(filter).with_provider(provider).with_page(1);
        });
    }

    /// Move to `page`, clamped into the page range of the loaded data under
    /// the current filters.
    ///
    /// Returns the page that will be shown.
    pub fn go_to_page(&self, page: usize) -> usize {
        let config = self.inner.service.config();
        let page = {
            let mut state = self.inner.state.lock();
            let last_page = state.data.as_ref().map_or(1, |data| {
                let matches = count_matches(
                    &data.games,
                    &state.filter,
                    self.inner.device,
                    &config.game_type_tags,
                );
                total_pages(matches, config.page_size)
            });
            let page = page.clamp(1, last_page);
            state.filter.page = page;
            self.inner.publish(&state);
            page
        };
        self.schedule_recompute();
        page
    }

    fn update_filter(&self, apply: impl FnOnce(&mut FilterState)) {
        {
            let mut state = self.inner.state.lock();
            apply(&mut state.filter);
            self.inner.publish(&state);
        }
        self.schedule_recompute();
    }

    fn schedule_recompute(&self) {
        let inner = Arc::clone(&self.inner);
        self.debouncer.trigger(async move {
            inner.recompute();
        });
    }

    /// Run the filter pass now, dropping any scheduled one
    pub fn recompute_now(&self) {
        self.debouncer.cancel();
        self.inner.recompute();
    }

    /// Whether a filter pass is scheduled but has not run yet
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn view(&self) -> CatalogView {
        self.inner.view_tx.borrow().clone()
    }

    /// Hand the current view to `render`
    pub fn render<R>(&self, render: impl FnOnce(&CatalogView) -> R) -> R {
        let view = self.view();
        render(&view)
    }

    /// Receive every published view
    pub fn subscribe(&self) -> watch::Receiver<CatalogView> {
        self.inner.view_tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::error::{CatalogError, CatalogResult};
    use crate::fetcher::CatalogSource;
    use crate::store::MemoryStore;
    use crate::two_tier::TwoTierCache;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedSource(Vec<CatalogEntry>);

    #[async_trait]
    impl CatalogSource for FixedSource {
        async fn fetch(
            &self,
            _scope: CatalogScope,
            _device: DeviceClass,
        ) -> CatalogResult<Vec<CatalogEntry>> {
            if self.0.is_empty() {
                Err(CatalogError::Status(500))
            } else {
                Ok(self.0.clone())
            }
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        let mut games = Vec::new();
        for i in 0..250 {
            let provider = if i % 2 == 0 { "NetEnt" } else { "Evolution" };
            let tag = if i % 5 == 0 { "live-casino" } else { "slots" };
            games.push(
                CatalogEntry::new(i.to_string(), format!("game {i}"), provider)
                    .with_tags([tag])
                    .with_devices(true, i % 10 != 0),
            );
        }
        games
    }

    fn browser(games: Vec<CatalogEntry>, device: DeviceClass) -> CatalogBrowser {
        let config = CatalogConfig::new().with_debounce(Duration::from_millis(100));
        let cache = TwoTierCache::from_config(Arc::new(MemoryStore::new()), &config);
        let source = Arc::new(FixedSource(games));
        let service = CatalogService::new(config, cache, source).unwrap();
        Arc::new(service).browser(CatalogScope::All, device)
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_then_debounced_recompute() {
        let browser = browser(catalog(), DeviceClass::Tablet);
        assert!(browser.load().await);

        let view = browser.view();
        assert!(!view.is_loading);
        assert_eq!(view.providers, vec!["Evolution", "NetEnt"]);
        assert!(view.games.is_empty());
        assert!(browser.is_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        let view = browser.view();
        assert_eq!(view.games.len(), 48);
        assert_eq!(view.total_matches, 250);
        assert_eq!(view.total_pages, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_sets_error() {
        let browser = browser(Vec::new(), DeviceClass::Desktop);
        assert!(!browser.load().await);

        let view = browser.view();
        assert!(view.is_error);
        assert!(!view.is_loading);
        assert!(view.games.is_empty());
        assert!(view.providers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_change_resets_page() {
        let browser = browser(catalog(), DeviceClass::Tablet);
        browser.load().await;
        browser.recompute_now();

        assert_eq!(browser.go_to_page(4), 4);
        browser.recompute_now();
        assert_eq!(browser.view().page, 4);

        browser.set_provider(Some("NetEnt"));
        assert_eq!(browser.filter().page, 1);
        tokio::time::sleep(Duration::from_millis(150)).await;

        let view = browser.view();
        assert_eq!(view.provider.as_deref(), Some("NetEnt"));
        assert_eq!(view.total_matches, 125);
        assert!(view.games.iter().all(|g| g.provider == "NetEnt"));

        browser.set_provider(Some(""));
        assert_eq!(browser.filter().provider, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_page_clamps() {
        let browser = browser(catalog(), DeviceClass::Tablet);
        browser.load().await;
        browser.recompute_now();

        assert_eq!(browser.go_to_page(0), 1);
        assert_eq!(browser.go_to_page(99), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_page_right_after_load() {
        let browser = browser(catalog(), DeviceClass::Tablet);
        browser.load().await;
        assert!(browser.is_pending());

        assert_eq!(browser.go_to_page(3), 3);
        tokio::time::sleep(Duration::from_millis(150)).await;

        let view = browser.view();
        assert_eq!(view.page, 3);
        assert_eq!(view.total_pages, 6);
        assert_eq!(view.games[0].id, "96");
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_page_after_widening_filter() {
        let browser = browser(catalog(), DeviceClass::Tablet);
        browser.load().await;
        browser.set_provider(Some("NetEnt"));
        browser.recompute_now();
        assert_eq!(browser.view().total_pages, 3);

        browser.set_provider(None);
        assert_eq!(browser.go_to_page(5), 5);
        browser.recompute_now();

        let view = browser.view();
        assert_eq!(view.provider, None);
        assert_eq!(view.page, 5);
        assert_eq!(view.total_pages, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_to_page_without_data_stays_on_first() {
        let browser = browser(Vec::new(), DeviceClass::Desktop);
        assert!(!browser.load().await);
        assert_eq!(browser.go_to_page(4), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_type_and_device_filters() {
        let browser = browser(catalog(), DeviceClass::Desktop);
        browser.load().await;
        browser.set_game_type("live");
        browser.recompute_now();

        let view = browser.view();
        // live-casino entries are every 5th; every 10th is mobile-only
        assert_eq!(view.total_matches, 25);
        for game in &view.games {
            assert!(game.has_tag("live-casino") && game.desktop);
        }
        assert!(!browser.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_changes_publishes_final_state() {
        let browser = browser(catalog(), DeviceClass::Tablet);
        browser.load().await;
        let mut rx = browser.subscribe();

        browser.set_game_type("live");
        browser.set_provider(Some("NetEnt"));
        browser.set_game_type("slot");
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(rx.has_changed().unwrap());
        let total = browser.render(|view| {
            assert_eq!(view.game_type, "slot");
            assert_eq!(view.provider.as_deref(), Some("NetEnt"));
            view.total_matches
        });
        // NetEnt is every even index; of those, multiples of 10 are live
        assert_eq!(total, 100);
    }
}
