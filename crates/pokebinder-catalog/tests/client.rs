//! Integration tests for `CatalogClient` using wiremock HTTP mocks.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pokebinder_catalog::{CatalogClient, CatalogError, RetryPolicy};

/// No-delay client with `max_retries` retries against the mock server.
fn test_client(base_url: &str, max_retries: u32) -> CatalogClient {
    CatalogClient::new(
        base_url,
        5,
        "pokebinder-test/0.1",
        RetryPolicy::fixed(max_retries, 0),
    )
    .expect("client construction should not fail")
}

#[tokio::test]
async fn fetch_groups_returns_parsed_groups() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tcgplayer/3/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "results": [
                { "groupId": 604, "name": "Base Set", "abbreviation": "BS" },
                { "groupId": 635, "name": "Jungle", "abbreviation": "JU" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/tcgplayer/3", server.uri()), 3);
    let groups = client.fetch_groups().await.expect("should parse groups");

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].group_id, 604);
    assert_eq!(groups[1].name, "Jungle");
}

#[tokio::test]
async fn fetch_products_passes_through_unknown_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/604/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "productId": 42382,
                "name": "Charizard",
                "imageUrl": "https://example.test/42382.jpg",
                "extendedData": [{ "name": "Rarity", "value": "Holo Rare" }]
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let products = client.fetch_products(604).await.expect("should parse products");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].product_id, 42382);
    assert_eq!(products[0].fields["name"], "Charizard");
    assert_eq!(products[0].fields["extendedData"][0]["value"], "Holo Rare");
}

#[tokio::test]
async fn fetch_prices_reads_nullable_price_points() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/604/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "productId": 42382,
                "lowPrice": 250.0,
                "midPrice": 399.99,
                "highPrice": 1200.0,
                "marketPrice": 410.5,
                "directLowPrice": null,
                "subTypeName": "Holofoil"
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let prices = client.fetch_prices(604).await.expect("should parse prices");

    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].market_price, Some(410.5));
    assert!(prices[0].direct_low_price.is_none());
    assert_eq!(prices[0].sub_type_name.as_deref(), Some("Holofoil"));
}

#[tokio::test]
async fn missing_results_key_reads_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let products = client.fetch_products(1).await.expect("should parse");
    assert!(products.is_empty());
}

#[tokio::test]
async fn always_failing_endpoint_is_attempted_four_times() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let result = client.fetch_groups().await;

    assert!(
        matches!(result, Err(CatalogError::UnexpectedStatus { status: 503, .. })),
        "expected 503 after exhausting retries, got: {result:?}"
    );
    server.verify().await;
}

#[tokio::test]
async fn transient_failure_recovers_on_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [{ "groupId": 1, "name": "Promo" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let groups = client.fetch_groups().await.expect("should recover");
    assert_eq!(groups.len(), 1);
}

#[tokio::test]
async fn malformed_body_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let result = client.fetch_groups().await;
    assert!(matches!(result, Err(CatalogError::Deserialize { .. })));
}

#[tokio::test]
async fn unreachable_host_surfaces_http_error() {
    // Nothing listens on port 1.
    let client = test_client("http://127.0.0.1:1", 1);
    let result = client.fetch_groups().await;
    assert!(matches!(result, Err(CatalogError::Http(_))));
}
