//! Remote market integration.
//!
//! Defines the `MarketApi` trait the set-profit engine reads through,
//! and provides the rate-limited warframe.market v2 client.
//!
//! Every implementation absorbs transport failures: callers receive
//! empty or absent data, never an error. "No data" is an expected
//! outcome for the engine, not an anomaly.

pub mod throttle;
pub mod warframe;

use async_trait::async_trait;
use serde::Serialize;

use crate::types::{CatalogItem, Order};

/// Read-only view of the remote market.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Fetch the lightweight list of every catalog item.
    /// Returns an empty list if the catalog cannot be fetched.
    async fn list_all_items(&self) -> Vec<CatalogItem>;

    /// Fetch static detail for an item. Repeated calls for the same slug
    /// may be served from a cache. `None` means the detail could not be
    /// fetched, which is distinct from an item that is not a set.
    async fn get_item_detail(&self, slug: &str) -> Option<CatalogItem>;

    /// Fetch the live order book for an item. Never cached.
    async fn get_orders(&self, slug: &str) -> Vec<Order>;

    /// Request counters, for logging and the status endpoint.
    fn stats(&self) -> ClientStats {
        ClientStats::default()
    }

    /// Market name for logging and identification.
    fn name(&self) -> &str;
}

/// Transport-level failures, caught inside the client.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Cumulative request counters for a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientStats {
    /// Requests actually put on the wire.
    pub requests_sent: u64,
    /// Requests that ended in a `MarketError`.
    pub failures: u64,
    /// Item-detail lookups answered from the cache.
    pub cache_hits: u64,
}

impl std::fmt::Display for ClientStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} requests, {} failed, {} cache hits",
            self.requests_sent, self.failures, self.cache_hits
        )
    }
}
