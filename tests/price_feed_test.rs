use idpay::domain::price::PriceMap;
use idpay::error::PaymentError;
use idpay::infrastructure::price_feed::{PriceCache, PriceFeed};
use rust_decimal_macros::dec;
use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, path_regex},
};

const CURRENT_PATH: &str = "/prices/current/coingecko:mantle,coingecko:ethereum";

fn feed(server: &MockServer) -> PriceFeed {
    PriceFeed::new(
        reqwest::Client::new(),
        &server.uri(),
        PriceCache::new(Duration::from_secs(60)),
    )
}

fn quote(mantle: serde_json::Value, ethereum: serde_json::Value) -> serde_json::Value {
    json!({
        "coins": {
            "coingecko:mantle": { "price": mantle, "symbol": "MNT" },
            "coingecko:ethereum": { "price": ethereum, "symbol": "ETH" }
        }
    })
}

#[tokio::test]
async fn test_current_prices() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote(json!(0.85), json!(2450))))
        .mount(&mock_server)
        .await;

    let prices = feed(&mock_server).prices().await.unwrap();
    assert_eq!(
        prices,
        PriceMap {
            mantle: dec!(0.85),
            ethereum: dec!(2450),
        }
    );
}

#[tokio::test]
async fn test_prices_are_cached_within_ttl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote(json!(0.85), json!(2450))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let feed = feed(&mock_server);
    let first = feed.prices().await.unwrap();
    let second = feed.prices().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_expired_cache_refetches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote(json!(0.85), json!(2450))))
        .expect(2)
        .mount(&mock_server)
        .await;

    let feed = PriceFeed::new(
        reqwest::Client::new(),
        &mock_server.uri(),
        PriceCache::new(Duration::ZERO),
    );
    feed.prices().await.unwrap();
    feed.prices().await.unwrap();
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = feed(&mock_server).prices().await.unwrap_err();
    assert!(matches!(err, PaymentError::PriceFeed(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_missing_price_is_invalid_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "coins": { "coingecko:mantle": { "price": 0.85 } }
        })))
        .mount(&mock_server)
        .await;

    let err = feed(&mock_server).prices().await.unwrap_err();
    assert!(err.to_string().contains("Invalid price data from API"));
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote(json!(1.1), json!(3000))))
        .mount(&mock_server)
        .await;

    let feed = feed(&mock_server);
    assert!(feed.prices().await.is_err());
    assert_eq!(feed.prices().await.unwrap().mantle, dec!(1.1));
}

#[tokio::test]
async fn test_prices_with_change() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CURRENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote(json!(0.9), json!(2450))))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(
            r"^/prices/historical/\d+/coingecko:mantle,coingecko:ethereum$",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote(json!(0.75), json!(0))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let quote = feed(&mock_server).prices_with_change().await.unwrap();
    assert_eq!(quote.usd.mantle, dec!(0.9));
    assert_eq!(quote.change_24h_pct.mantle, dec!(20));
    assert_eq!(quote.change_24h_pct.ethereum, dec!(0));
}
