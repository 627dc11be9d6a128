//! Shared types for SETSCAN.
//!
//! These types form the data model used across the market client, the
//! set-profit engine and the dashboard. They carry no I/O so every
//! other module can depend on them without circular references.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A tradable item from the remote catalog.
///
/// The list endpoint only fills `id`, `slug` and `display_name`; the
/// set-membership fields come from the per-item detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    /// URL-safe identifier used by every per-item endpoint.
    pub slug: String,
    pub display_name: String,
    /// Whether this entry is the assembled, sellable whole of its set.
    #[serde(default)]
    pub is_set_root: bool,
    /// Ids of every item belonging to the set this item heads.
    /// `None` means the item is not a set.
    #[serde(default)]
    pub set_part_ids: Option<Vec<String>>,
    /// How many of this item the set needs. `None` or `0` means one.
    #[serde(default)]
    pub quantity_in_set: Option<u32>,
}

impl CatalogItem {
    /// A "lite" catalog entry as returned by the list endpoint.
    pub fn lite(id: &str, slug: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            slug: slug.to_string(),
            display_name: display_name.to_string(),
            is_set_root: false,
            set_part_ids: None,
            quantity_in_set: None,
        }
    }

    /// Whether the detail declares set membership at all.
    pub fn is_set(&self) -> bool {
        self.set_part_ids.is_some()
    }

    /// Required quantity in the set, treating a missing or zero value as 1.
    pub fn required_quantity(&self) -> u32 {
        match self.quantity_in_set {
            Some(q) if q > 0 => q,
            _ => 1,
        }
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.slug)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Parse the wire value (`"buy"` / `"sell"`). Unknown sides yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Presence of the user who posted an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerStatus {
    Online,
    Ingame,
    Offline,
    Other,
}

impl SellerStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "online" => Self::Online,
            "ingame" => Self::Ingame,
            "offline" => Self::Offline,
            _ => Self::Other,
        }
    }

    /// Only sellers who are connected can actually complete a trade.
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Online | Self::Ingame)
    }
}

/// A single live order. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub side: OrderSide,
    /// Price in platinum.
    pub price: u64,
    pub seller_status: SellerStatus,
}

impl Order {
    pub fn new(side: OrderSide, price: u64, seller_status: SellerStatus) -> Self {
        Self { side, price, seller_status }
    }
}

// ---------------------------------------------------------------------------
// Evaluations
// ---------------------------------------------------------------------------

/// Price of one component line in a set's bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPricing {
    pub name: String,
    pub unit_price: u64,
    pub quantity: u32,
    pub line_cost: u64,
}

impl ComponentPricing {
    pub fn new(name: impl Into<String>, unit_price: u64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity,
            line_cost: unit_price * u64::from(quantity),
        }
    }
}

impl fmt::Display for ComponentPricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {} = {}", self.quantity, self.unit_price, self.line_cost)
    }
}

/// A fully priced set-assembly opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEvaluation {
    pub set_name: String,
    pub set_sell_price: u64,
    pub total_component_cost: u64,
    /// `set_sell_price - total_component_cost`; may be negative.
    pub profit: i64,
    /// One transaction per component unit plus the set itself.
    pub trade_count: u32,
    pub components: Vec<ComponentPricing>,
}

impl SetEvaluation {
    /// Build an evaluation, deriving cost, profit and trade count from
    /// the component lines.
    pub fn new(
        set_name: impl Into<String>,
        set_sell_price: u64,
        components: Vec<ComponentPricing>,
    ) -> Self {
        let total_component_cost: u64 = components.iter().map(|c| c.line_cost).sum();
        let trade_count = components.iter().map(|c| c.quantity).sum::<u32>() + 1;
        Self {
            set_name: set_name.into(),
            set_sell_price,
            total_component_cost,
            profit: set_sell_price as i64 - total_component_cost as i64,
            trade_count,
            components,
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.profit > 0
    }
}

impl fmt::Display for SetEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: sell {}p | cost {}p | profit {:+}p | {} trades",
            self.set_name,
            self.set_sell_price,
            self.total_component_cost,
            self.profit,
            self.trade_count,
        )
    }
}

/// Whether a result collection is ordered by ascending component cost.
pub fn is_sorted_by_cost(results: &[SetEvaluation]) -> bool {
    results
        .windows(2)
        .all(|w| w[0].total_component_cost <= w[1].total_component_cost)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
