//! Integration tests for the HTTP catalog source
//!
//! These tests run the source against a mock catalog endpoint.

use gamedeck_catalog::{
    CatalogConfig, CatalogError, CatalogScope, CatalogSource, DeviceClass, HttpCatalogSource,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer) -> HttpCatalogSource {
    let config = CatalogConfig::new()
        .with_endpoint(&format!("{}/api/games", server.uri()))
        .unwrap();
    HttpCatalogSource::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetch_current_shape_sends_bulk_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/games"))
        .and(query_param("type", "slot"))
        .and(query_param("device", "mobile"))
        .and(query_param("per_page", "10000"))
        .and(query_param("page", "1"))
        .and(query_param("use_cache", "true"))
        .and(query_param("max_results", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "games": [
                {"id": "1", "name": "Starburst", "provider": "NetEnt", "tags": ["slots"], "mobile": true, "desktop": true},
                {"id": "2", "name": "Gonzo", "provider": "NetEnt", "tags": ["slots"], "mobile": true, "desktop": false}
            ],
            "total": 2
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let games = source_for(&mock_server)
        .fetch(CatalogScope::Slot, DeviceClass::Mobile)
        .await
        .unwrap();

    assert_eq!(games.len(), 2);
    assert_eq!(games[0].name, "Starburst");
    assert!(!games[1].desktop);
}

#[tokio::test]
async fn test_fetch_legacy_array_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/games"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "9", "name": "Lightning Roulette", "provider": "Evolution", "tags": ["live-casino"]}
        ])))
        .mount(&mock_server)
        .await;

    let games = source_for(&mock_server)
        .fetch(CatalogScope::Casino, DeviceClass::Desktop)
        .await
        .unwrap();

    assert_eq!(games.len(), 1);
    assert!(games[0].mobile && games[0].desktop);
}

#[tokio::test]
async fn test_fetch_empty_catalog_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"games": [], "total": 0})))
        .mount(&mock_server)
        .await;

    let err = source_for(&mock_server)
        .fetch(CatalogScope::All, DeviceClass::Tablet)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::EmptyCatalog));
}

#[tokio::test]
async fn test_fetch_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = source_for(&mock_server)
        .fetch(CatalogScope::All, DeviceClass::Desktop)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Status(503)));
    assert!(err.is_fetch_failure());
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let err = source_for(&mock_server)
        .fetch(CatalogScope::Slot, DeviceClass::Desktop)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Malformed(_)));
}

#[tokio::test]
async fn test_fetch_unreachable_endpoint() {
    let config = CatalogConfig::new()
        .with_endpoint("http://127.0.0.1:9/api/games")
        .unwrap();
    let source = HttpCatalogSource::new(&config).unwrap();

    let err = source
        .fetch(CatalogScope::Slot, DeviceClass::Desktop)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Http(_)));
}
