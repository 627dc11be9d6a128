//! Per-candidate set evaluation.
//!
//! Turns one candidate catalog entry into either a fully priced
//! `SetEvaluation` or a `DiscardReason`. A discard is an ordinary
//! outcome: the remote catalog is full of stale references, unlisted
//! parts and sets nobody is selling.

use std::fmt;
use tracing::debug;

use super::catalog::CatalogIndex;
use super::pricing::lowest_valid_sell_price;
use crate::market::MarketApi;
use crate::types::{CatalogItem, ComponentPricing, SetEvaluation};

/// Why a candidate produced no evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// The candidate's own detail could not be fetched.
    DetailUnavailable,
    /// The detail carries no set-membership fields.
    NotASet,
    /// Neither a part nor the candidate is flagged as the set root.
    NoRoot,
    /// Nobody reachable is selling the assembled set.
    NoSetMarket,
    /// Nobody reachable is selling this component (slug).
    UnpricedComponent(String),
}

impl DiscardReason {
    /// Stable label for counting discards by kind.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DetailUnavailable => "detail_unavailable",
            Self::NotASet => "not_a_set",
            Self::NoRoot => "no_root",
            Self::NoSetMarket => "no_set_market",
            Self::UnpricedComponent(_) => "unpriced_component",
        }
    }
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnpricedComponent(slug) => write!(f, "unpriced_component ({slug})"),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Priced(SetEvaluation),
    Discarded(DiscardReason),
}

impl Evaluation {
    pub fn priced(self) -> Option<SetEvaluation> {
        match self {
            Self::Priced(eval) => Some(eval),
            Self::Discarded(_) => None,
        }
    }
}

/// A set split into its sellable whole and its buildable pieces.
#[derive(Debug, Clone, PartialEq)]
pub struct SetParts {
    pub root: CatalogItem,
    pub components: Vec<CatalogItem>,
}

/// Split resolved parts into root and components.
///
/// 1. A part flagged as root is the root (the last flagged part wins).
/// 2. Otherwise the candidate itself is the root if it carries the flag.
/// 3. Otherwise there is no root.
///
/// The flag is observed service behaviour, not a documented contract.
pub fn resolve_root(candidate: &CatalogItem, parts: Vec<CatalogItem>) -> Option<SetParts> {
    let mut root = None;
    let mut components = Vec::with_capacity(parts.len());

    for part in parts {
        if part.is_set_root {
            root = Some(part);
        } else {
            components.push(part);
        }
    }

    let root = root.or_else(|| candidate.is_set_root.then(|| candidate.clone()))?;
    Some(SetParts { root, components })
}

/// Evaluate a candidate against live order books.
///
/// Requests are issued strictly one at a time: candidate detail, part
/// details, root orders, then component orders (stopping at the first
/// unpriced component).
pub async fn evaluate_candidate(
    api: &dyn MarketApi,
    index: &CatalogIndex,
    candidate: &CatalogItem,
) -> Evaluation {
    match price_candidate(api, index, candidate).await {
        Ok(eval) => Evaluation::Priced(eval),
        Err(reason) => {
            debug!(slug = %candidate.slug, reason = %reason, "Candidate discarded");
            Evaluation::Discarded(reason)
        }
    }
}

async fn price_candidate(
    api: &dyn MarketApi,
    index: &CatalogIndex,
    candidate: &CatalogItem,
) -> Result<SetEvaluation, DiscardReason> {
    let detail = api
        .get_item_detail(&candidate.slug)
        .await
        .ok_or(DiscardReason::DetailUnavailable)?;

    let part_ids = detail.set_part_ids.clone().ok_or(DiscardReason::NotASet)?;

    let mut parts = Vec::with_capacity(part_ids.len());
    for id in &part_ids {
        let Some(slug) = index.slug_for(id) else {
            debug!(set = %candidate.slug, part_id = %id, "Part missing from catalog, skipping");
            continue;
        };
        match api.get_item_detail(slug).await {
            Some(part) => parts.push(part),
            None => debug!(set = %candidate.slug, part = slug, "Part detail unavailable, skipping"),
        }
    }

    let SetParts { root, components } =
        resolve_root(&detail, parts).ok_or(DiscardReason::NoRoot)?;

    let set_price = lowest_valid_sell_price(&api.get_orders(&root.slug).await)
        .ok_or(DiscardReason::NoSetMarket)?;

    let mut lines = Vec::with_capacity(components.len());
    for component in &components {
        let unit_price = lowest_valid_sell_price(&api.get_orders(&component.slug).await)
            .ok_or_else(|| DiscardReason::UnpricedComponent(component.slug.clone()))?;
        lines.push(ComponentPricing::new(
            component.display_name.clone(),
            unit_price,
            component.required_quantity(),
        ));
    }

    Ok(SetEvaluation::new(root.display_name, set_price, lines))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
