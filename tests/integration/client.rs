//! `WarframeMarketClient` against the fake market.

use serde_json::json;
use std::sync::Arc;

use setscan::config::MarketConfig;
use setscan::market::warframe::WarframeMarketClient;
use setscan::market::MarketApi;
use setscan::types::{OrderSide, SellerStatus};

use crate::fake_market::{self, assert_spaced, FakeMarket, BROKEN_SLUG, TEST_INTERVAL};

async fn client_for(market: FakeMarket) -> (Arc<FakeMarket>, WarframeMarketClient) {
    let (fake, cfg) = fake_market::spawn(market).await;
    (fake, WarframeMarketClient::with_config(&cfg).unwrap())
}

#[tokio::test]
async fn test_list_all_items() {
    let (fake, client) = client_for(fake_market::alpha_market()).await;
    let items = client.list_all_items().await;

    assert_eq!(items.len(), 4);
    assert_eq!(items[0].slug, "alpha_prime_set");
    assert_eq!(items[0].display_name, "Alpha Prime Set");
    // The list is "lite": no set fields.
    assert!(items.iter().all(|i| !i.is_set() && !i.is_set_root));
    assert_eq!(fake.hits_for("/v2/items"), 1);
}

#[tokio::test]
async fn test_item_detail_is_cached() {
    let (fake, client) = client_for(fake_market::alpha_market()).await;

    let first = client.get_item_detail("alpha_prime_set").await.unwrap();
    let second = client.get_item_detail("alpha_prime_set").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.set_part_ids,
        Some(vec!["alpha-root".to_string(), "alpha-bp".to_string(), "alpha-barrel".to_string()])
    );
    assert_eq!(fake.hits_for("/v2/items/alpha_prime_set"), 1);
    assert_eq!(client.stats().cache_hits, 1);
    assert_eq!(client.stats().requests_sent, 1);
    assert_eq!(client.cached_items().await, 1);
}

#[tokio::test]
async fn test_non_set_detail_is_cached_too() {
    let (fake, client) = client_for(FakeMarket::new().item("m", "serration", "Serration", json!({}))).await;

    let item = client.get_item_detail("serration").await.unwrap();
    assert!(!item.is_set());
    client.get_item_detail("serration").await.unwrap();
    assert_eq!(fake.hits_for("/v2/items/serration"), 1);
}

#[tokio::test]
async fn test_missing_detail_is_none_and_not_cached() {
    let (fake, client) = client_for(FakeMarket::new()).await;

    assert!(client.get_item_detail("nope").await.is_none());
    assert!(client.get_item_detail("nope").await.is_none());

    assert_eq!(fake.hits_for("/v2/items/nope"), 2);
    assert_eq!(client.stats().failures, 2);
    assert_eq!(client.cached_items().await, 0);
}

#[tokio::test]
async fn test_orders_are_never_cached() {
    let (fake, client) = client_for(fake_market::alpha_market()).await;

    let orders = client.get_orders("alpha_prime").await;
    client.get_orders("alpha_prime").await;

    assert_eq!(orders.len(), 4);
    assert_eq!(orders[1].side, OrderSide::Sell);
    assert_eq!(orders[1].price, 300);
    assert_eq!(orders[1].seller_status, SellerStatus::Ingame);
    assert_eq!(orders[3].side, OrderSide::Buy);
    assert_eq!(fake.hits_for("/v2/orders/item/alpha_prime"), 2);
}

#[tokio::test]
async fn test_malformed_payloads_become_empty() {
    let (_, client) = client_for(FakeMarket::new()).await;

    assert!(client.get_orders(BROKEN_SLUG).await.is_empty());
    assert!(client.get_item_detail(BROKEN_SLUG).await.is_none());
    assert_eq!(client.stats().failures, 2);
}

#[tokio::test]
async fn test_missing_orders_become_empty() {
    let (_, client) = client_for(FakeMarket::new()).await;
    assert!(client.get_orders("unknown").await.is_empty());
}

#[tokio::test]
async fn test_unreachable_service_yields_empty_catalog() {
    let cfg = MarketConfig {
        base_url: "http://127.0.0.1:1/v2".into(),
        request_interval_ms: 1,
        timeout_secs: 2,
        ..MarketConfig::default()
    };
    let client = WarframeMarketClient::with_config(&cfg).unwrap();

    assert!(client.list_all_items().await.is_empty());
    assert!(client.get_item_detail("x").await.is_none());
    assert!(client.get_orders("x").await.is_empty());
    assert_eq!(client.stats().failures, 3);
}

#[tokio::test]
async fn test_identifies_as_pc_client() {
    let (fake, client) = client_for(fake_market::alpha_market()).await;
    client.list_all_items().await;
    assert_eq!(fake.hits()[0].platform.as_deref(), Some("pc"));
}

#[tokio::test]
async fn test_requests_are_spaced_across_operations() {
    let (fake, client) = client_for(fake_market::alpha_market()).await;

    client.list_all_items().await;
    client.get_item_detail("alpha_prime_set").await;
    client.get_item_detail("alpha_prime_set").await; // cached, no request
    client.get_orders("alpha_prime").await;
    client.get_orders("alpha_prime_barrel").await;
    client.get_item_detail("missing").await;

    let hits = fake.hits();
    assert_eq!(hits.len(), 5);
    assert_spaced(&hits, TEST_INTERVAL);
}

#[tokio::test]
async fn test_concurrent_callers_share_the_budget() {
    let (fake, client) = client_for(fake_market::alpha_market()).await;
    let client = Arc::new(client);

    let mut handles = Vec::new();
    for slug in ["alpha_prime", "alpha_prime_blueprint", "alpha_prime_barrel", "alpha_prime"] {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.get_orders(slug).await.len() }));
    }
    for handle in handles {
        assert!(handle.await.unwrap() > 0);
    }

    let hits = fake.hits();
    assert_eq!(hits.len(), 4);
    assert_spaced(&hits, TEST_INTERVAL);
}
