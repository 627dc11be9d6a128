//! Fake warframe.market for integration testing.
//!
//! An Axum server bound to an ephemeral local port that serves fixed
//! catalog, detail and order payloads, and records every request it
//! receives (path, arrival time and `Platform` header).

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use setscan::config::MarketConfig;

/// Slug whose endpoints answer 200 with a body that is not JSON.
pub const BROKEN_SLUG: &str = "broken_payload";

/// Request spacing used by test clients.
pub const TEST_INTERVAL: Duration = Duration::from_millis(60);

#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub at: Instant,
    pub platform: Option<String>,
}

#[derive(Default)]
pub struct FakeMarket {
    items: Vec<Value>,
    details: HashMap<String, Value>,
    orders: HashMap<String, Value>,
    hits: Mutex<Vec<Hit>>,
}

impl FakeMarket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item. `extra` holds detail-only fields such as
    /// `setParts`, `setRoot` and `quantityInSet`.
    pub fn item(mut self, id: &str, slug: &str, name: &str, extra: Value) -> Self {
        let lite = json!({"id": id, "slug": slug, "i18n": {"en": {"name": name}}});
        let mut detail = lite.clone();
        if let (Some(d), Some(e)) = (detail.as_object_mut(), extra.as_object()) {
            d.extend(e.clone());
        }
        self.items.push(lite);
        self.details.insert(slug.to_string(), detail);
        self
    }

    /// Register `(type, platinum, status)` orders for a slug.
    pub fn orders(mut self, slug: &str, orders: &[(&str, u64, &str)]) -> Self {
        let data: Vec<Value> = orders
            .iter()
            .map(|(t, p, s)| json!({"type": t, "platinum": p, "user": {"status": s}}))
            .collect();
        self.orders.insert(slug.to_string(), Value::Array(data));
        self
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hits_for(&self, path: &str) -> usize {
        self.hits().iter().filter(|h| h.path == path).count()
    }

    fn record(&self, path: String, headers: &HeaderMap) {
        let platform = headers
            .get("Platform")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.hits.lock().unwrap().push(Hit { path, at: Instant::now(), platform });
    }
}

type Shared = Arc<FakeMarket>;

fn envelope(data: Option<&Value>, slug: &str) -> Response {
    if slug == BROKEN_SLUG {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    match data {
        Some(data) => axum::Json(json!({ "data": data })).into_response(),
        None => (StatusCode::NOT_FOUND, axum::Json(json!({"error": "not found"}))).into_response(),
    }
}

async fn list_items(State(m): State<Shared>, headers: HeaderMap) -> Response {
    m.record("/v2/items".into(), &headers);
    axum::Json(json!({ "data": m.items })).into_response()
}

async fn item_detail(
    State(m): State<Shared>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    m.record(format!("/v2/items/{slug}"), &headers);
    envelope(m.details.get(&slug), &slug)
}

async fn item_orders(
    State(m): State<Shared>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    m.record(format!("/v2/orders/item/{slug}"), &headers);
    envelope(m.orders.get(&slug), &slug)
}

/// Start the fake on an ephemeral port. Returns the shared state and a
/// client config pointing at it.
pub async fn spawn(market: FakeMarket) -> (Shared, MarketConfig) {
    let shared = Arc::new(market);
    let app = Router::new()
        .route("/v2/items", get(list_items))
        .route("/v2/items/:slug", get(item_detail))
        .route("/v2/orders/item/:slug", get(item_orders))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let cfg = MarketConfig {
        base_url: format!("http://{addr}/v2"),
        request_interval_ms: TEST_INTERVAL.as_millis() as u64,
        timeout_secs: 5,
        ..MarketConfig::default()
    };
    (shared, cfg)
}

/// The "Alpha Prime Set" scenario: root "Alpha Prime" lowest 300,
/// blueprint (x2) lowest 50, barrel (x1) lowest 40.
pub fn alpha_market() -> FakeMarket {
    FakeMarket::new()
        .item(
            "alpha-set",
            "alpha_prime_set",
            "Alpha Prime Set",
            json!({"setParts": ["alpha-root", "alpha-bp", "alpha-barrel"]}),
        )
        .item("alpha-root", "alpha_prime", "Alpha Prime", json!({"setRoot": true}))
        .item("alpha-bp", "alpha_prime_blueprint", "Alpha Blueprint", json!({"quantityInSet": 2}))
        .item("alpha-barrel", "alpha_prime_barrel", "Alpha Barrel", json!({"quantityInSet": 1}))
        .orders(
            "alpha_prime",
            &[("sell", 320, "online"), ("sell", 300, "ingame"), ("sell", 150, "offline"), ("buy", 400, "online")],
        )
        .orders("alpha_prime_blueprint", &[("sell", 55, "online"), ("sell", 50, "online")])
        .orders("alpha_prime_barrel", &[("sell", 40, "ingame")])
}

/// Assert consecutive arrivals are at least `interval` apart.
pub fn assert_spaced(hits: &[Hit], interval: Duration) {
    let mut times: Vec<Instant> = hits.iter().map(|h| h.at).collect();
    times.sort();
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= interval, "requests only {gap:?} apart (want {interval:?})");
    }
}
