//! warframe.market v2 read-only client.
//!
//! API: `https://api.warframe.market/v2`
//! Auth: Not required for reading.
//! Rate limit: ~3 requests/second per client, enforced locally by
//! `RequestThrottle` across every endpoint.
//! Envelope: every payload sits under a top-level `data` key.
//!
//! Item detail is static reference data and is cached per slug for the
//! life of the client. Order books are volatile and always refetched.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::throttle::RequestThrottle;
use super::{ClientStats, MarketApi, MarketError};
use crate::config::MarketConfig;
use crate::types::{CatalogItem, Order, OrderSide, SellerStatus};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const MARKET_NAME: &str = "warframe.market";

/// Locale always present in catalog payloads; used when the configured
/// language has no translation.
const FALLBACK_LANGUAGE: &str = "en";

// ---------------------------------------------------------------------------
// API response types (warframe.market JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Item as returned by `/items` (lite) and `/items/{slug}` (detail).
/// The set fields are only present on detail payloads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireItem {
    id: String,
    slug: String,
    #[serde(default)]
    i18n: HashMap<String, WireI18n>,
    #[serde(default)]
    set_root: Option<bool>,
    #[serde(default)]
    set_parts: Option<Vec<String>>,
    #[serde(default)]
    quantity_in_set: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireI18n {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireOrder {
    #[serde(rename = "type")]
    order_type: String,
    platinum: u64,
    #[serde(default)]
    user: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    #[serde(default)]
    status: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Rate-limited, caching warframe.market client.
pub struct WarframeMarketClient {
    http: Client,
    base_url: String,
    language: String,
    throttle: RequestThrottle,
    /// Slug → detail. Entries are never replaced once stored.
    item_cache: RwLock<HashMap<String, CatalogItem>>,
    requests_sent: AtomicU64,
    failures: AtomicU64,
    cache_hits: AtomicU64,
}

impl WarframeMarketClient {
    /// Create a client with the default endpoint and request spacing.
    pub fn new() -> Result<Self> {
        Self::with_config(&MarketConfig::default())
    }

    /// Create a client from configuration.
    pub fn with_config(cfg: &MarketConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("platform"),
            HeaderValue::from_str(&cfg.platform)
                .context("Invalid Platform header value")?,
        );
        headers.insert(
            HeaderName::from_static("language"),
            HeaderValue::from_str(&cfg.language)
                .context("Invalid Language header value")?,
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(cfg.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client for warframe.market")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            language: cfg.language.clone(),
            throttle: RequestThrottle::new(Duration::from_millis(cfg.request_interval_ms)),
            item_cache: RwLock::new(HashMap::new()),
            requests_sent: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        })
    }

    /// Number of item details currently cached.
    pub async fn cached_items(&self) -> usize {
        self.item_cache.read().await.len()
    }

    // -- Internal helpers ------------------------------------------------

    fn items_url(&self) -> String {
        format!("{}/items", self.base_url)
    }

    fn item_url(&self, slug: &str) -> String {
        format!("{}/items/{}", self.base_url, urlencoding::encode(slug))
    }

    fn orders_url(&self, slug: &str) -> String {
        format!("{}/orders/item/{}", self.base_url, urlencoding::encode(slug))
    }

    /// GET `url` through the throttle and unwrap the `data` envelope.
    /// Failures are counted and logged here; callers only see the error
    /// to decide which empty value to return.
    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, MarketError> {
        let http = &self.http;
        let sent = &self.requests_sent;

        let result = self
            .throttle
            .run(move || {
                sent.fetch_add(1, Ordering::Relaxed);
                debug!(url = %url, "Fetching warframe.market");
                Self::send::<T>(http, url)
            })
            .await;

        if let Err(e) = &result {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "warframe.market request failed");
        }

        result
    }

    async fn send<T: DeserializeOwned>(http: &Client, url: &str) -> Result<T, MarketError> {
        let resp = http.get(url).send().await.map_err(|source| MarketError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MarketError::Status { url: url.to_string(), status });
        }

        let body = resp.text().await.map_err(|source| MarketError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str::<Envelope<T>>(&body)
            .map(|envelope| envelope.data)
            .map_err(|source| MarketError::Decode { url: url.to_string(), source })
    }

    /// Pick the display name in the configured language, falling back
    /// to English and finally the slug.
    fn display_name(&self, item: &WireItem) -> String {
        [self.language.as_str(), FALLBACK_LANGUAGE]
            .iter()
            .find_map(|lang| item.i18n.get(*lang).and_then(|t| t.name.clone()))
            .unwrap_or_else(|| item.slug.clone())
    }

    fn to_catalog_item(&self, item: WireItem) -> CatalogItem {
        let display_name = self.display_name(&item);
        CatalogItem {
            id: item.id,
            slug: item.slug,
            display_name,
            is_set_root: item.set_root.unwrap_or(false),
            set_part_ids: item.set_parts,
            quantity_in_set: item.quantity_in_set,
        }
    }

    /// Convert wire orders, dropping any with a side we don't recognise.
    fn to_orders(raw: Vec<WireOrder>) -> Vec<Order> {
        raw.into_iter()
            .filter_map(|o| {
                let side = OrderSide::parse(&o.order_type)?;
                let status = o
                    .user
                    .as_ref()
                    .map(|u| SellerStatus::parse(&u.status))
                    .unwrap_or(SellerStatus::Other);
                Some(Order::new(side, o.platinum, status))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// MarketApi trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl MarketApi for WarframeMarketClient {
    async fn list_all_items(&self) -> Vec<CatalogItem> {
        match self.fetch::<Vec<WireItem>>(&self.items_url()).await {
            Ok(items) => {
                let items: Vec<CatalogItem> =
                    items.into_iter().map(|i| self.to_catalog_item(i)).collect();
                info!(count = items.len(), "warframe.market catalog fetched");
                items
            }
            Err(_) => Vec::new(),
        }
    }

    async fn get_item_detail(&self, slug: &str) -> Option<CatalogItem> {
        if let Some(item) = self.item_cache.read().await.get(slug) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Some(item.clone());
        }

        let item = self
            .fetch::<WireItem>(&self.item_url(slug))
            .await
            .ok()
            .map(|raw| self.to_catalog_item(raw))?;

        // A concurrent caller may have stored the same slug meanwhile;
        // the first stored detail wins.
        let mut cache = self.item_cache.write().await;
        Some(cache.entry(slug.to_string()).or_insert(item).clone())
    }

    async fn get_orders(&self, slug: &str) -> Vec<Order> {
        self.fetch::<Vec<WireOrder>>(&self.orders_url(slug))
            .await
            .map(Self::to_orders)
            .unwrap_or_default()
    }

    fn stats(&self) -> ClientStats {
        ClientStats {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }

    fn name(&self) -> &str {
        MARKET_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
