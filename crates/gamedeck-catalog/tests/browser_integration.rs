//! Integration tests for catalog browsers backed by a mock endpoint

use gamedeck_catalog::{
    CatalogBrowser, CatalogConfig, CatalogScope, CatalogService, CatalogView, DeviceClass,
    HttpCatalogSource, MemoryStore, TwoTierCache,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROVIDERS: [&str; 3] = ["NetEnt", "Evolution", "Play'n GO"];

fn catalog_body(count: usize) -> Value {
    let games: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("g{i}"),
                "name": format!("Game {i}"),
                "provider": PROVIDERS[i % 3],
                "tags": [if i % 3 == 1 { "live-casino" } else { "slots" }],
                "mobile": i % 2 == 0,
                "desktop": true
            })
        })
        .collect();
    json!(games)
}

/// Service with an in-memory persisted tier so tests do not touch disk
fn service_for(server: &MockServer) -> Arc<CatalogService> {
    let config = CatalogConfig::new()
        .with_endpoint(&server.uri())
        .unwrap()
        .with_debounce(Duration::from_millis(20));
    let cache = TwoTierCache::from_config(Arc::new(MemoryStore::new()), &config);
    let source = Arc::new(HttpCatalogSource::new(&config).unwrap());
    Arc::new(CatalogService::new(config, cache, source).unwrap())
}

async fn settle(browser: &CatalogBrowser) {
    while browser.is_pending() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_browser_shows_first_page_after_load() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(90)))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let browser = service.browser(CatalogScope::All, DeviceClass::Mobile);
    let mut views = browser.subscribe();

    assert!(browser.load().await);
    settle(&browser).await;

    let view = views.borrow_and_update().clone();
    assert!(!view.is_loading);
    assert!(!view.is_error);
    assert_eq!(view.providers, vec!["Evolution", "NetEnt", "Play'n GO"]);
    // Only even ids are mobile-capable
    assert_eq!(view.total_matches, 45);
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.games.len(), 45);
    assert!(view.games.iter().all(|g| g.mobile));
}

#[tokio::test]
async fn test_browser_error_then_recovery() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(10)))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let browser = service.browser(CatalogScope::Slot, DeviceClass::Desktop);

    assert!(!browser.load().await);
    let failed = browser.view();
    assert!(failed.is_error);
    assert!(failed.games.is_empty());
    assert!(failed.providers.is_empty());

    assert!(browser.load().await);
    settle(&browser).await;
    let view = browser.view();
    assert!(!view.is_error);
    assert_eq!(view.games.len(), 10);
}

#[tokio::test]
async fn test_browsers_share_the_service_cache() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("type", "casino"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(30)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let lobby = service.browser(CatalogScope::Casino, DeviceClass::Desktop);
    let sidebar = service.browser(CatalogScope::Casino, DeviceClass::Desktop);

    assert!(lobby.load().await);
    assert!(sidebar.load().await);

    sidebar.set_game_type("live");
    lobby.recompute_now();
    sidebar.recompute_now();

    assert_eq!(lobby.view().total_matches, 30);
    assert_eq!(sidebar.view().total_matches, 10);
}

#[tokio::test]
async fn test_recompute_uses_latest_loaded_data() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(6)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(60)))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let browser = service.browser(CatalogScope::Slot, DeviceClass::Tablet);

    assert!(browser.load().await);
    browser.set_game_type("live");
    // Replace the cached catalog before the scheduled pass runs
    service
        .refresh(CatalogScope::Slot, DeviceClass::Tablet)
        .await
        .unwrap();
    assert!(browser.load().await);
    settle(&browser).await;

    let view: CatalogView = browser.render(Clone::clone);
    assert_eq!(view.game_type, "live");
    assert_eq!(view.total_matches, 20);
    assert_eq!(view.games.len(), 20);
    assert_eq!(view.total_pages, 1);
    assert!(view.games.iter().all(|g| g.has_tag("live-casino")));
}
