//! Set-profit scanner.
//!
//! Loads the catalog once per process, selects candidate sets by name,
//! evaluates them one after another and keeps the profitable ones in a
//! cost-ranked collection. After every new profitable set the whole
//! ranked collection is handed to the progress sink, so a concurrent
//! observer always sees a complete, sorted view.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::catalog::CatalogIndex;
use super::evaluator::{evaluate_candidate, Evaluation};
use crate::config::ScannerConfig;
use crate::market::MarketApi;
use crate::types::{is_sorted_by_cost, SetEvaluation};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counters for one scan, logged when it finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub catalog_size: usize,
    pub candidates: usize,
    pub priced: usize,
    pub profitable: usize,
    /// Discards keyed by `DiscardReason::label`.
    pub discarded: BTreeMap<&'static str, usize>,
}

impl ScanSummary {
    pub fn total_discarded(&self) -> usize {
        self.discarded.values().sum()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Scans the market for profitable set assemblies.
///
/// The engine has no re-entrancy guard: callers must not drive two scans
/// over the same client at once.
pub struct SetProfitEngine {
    api: Arc<dyn MarketApi>,
    /// Populated on the first scan with a non-empty catalog.
    catalog: OnceCell<CatalogIndex>,
    set_marker: String,
}

impl SetProfitEngine {
    pub fn new(api: Arc<dyn MarketApi>, cfg: &ScannerConfig) -> Self {
        Self {
            api,
            catalog: OnceCell::new(),
            set_marker: cfg.set_marker.clone(),
        }
    }

    pub fn api(&self) -> &Arc<dyn MarketApi> {
        &self.api
    }

    /// The catalog index, loading it on first use.
    ///
    /// An empty catalog is not stored, so the next scan tries again.
    async fn catalog(&self) -> Option<&CatalogIndex> {
        self.catalog
            .get_or_try_init(|| async {
                info!(market = self.api.name(), "Initializing item catalog...");
                let items = self.api.list_all_items().await;
                if items.is_empty() {
                    return Err(());
                }
                let index = CatalogIndex::from_items(items);
                info!(count = index.len(), "Item catalog loaded");
                Ok(index)
            })
            .await
            .ok()
    }

    /// Run one full scan.
    ///
    /// `progress` receives an owned snapshot of the entire ranked
    /// collection each time a profitable set is added. The return value
    /// equals the last snapshot, or is empty if nothing was profitable.
    pub async fn run_scan<F>(&self, mut progress: F) -> Vec<SetEvaluation>
    where
        F: FnMut(Vec<SetEvaluation>) + Send,
    {
        let mut results: Vec<SetEvaluation> = Vec::new();

        let Some(index) = self.catalog().await else {
            warn!("Item catalog unavailable, scan produced no results");
            return results;
        };

        let candidates: Vec<_> = index.candidates(&self.set_marker).collect();
        let mut summary = ScanSummary {
            catalog_size: index.len(),
            candidates: candidates.len(),
            ..ScanSummary::default()
        };
        info!(
            count = candidates.len(),
            marker = %self.set_marker,
            "Candidate sets selected"
        );

        for (i, candidate) in candidates.iter().enumerate() {
            debug!(
                n = i + 1,
                of = candidates.len(),
                slug = %candidate.slug,
                "Scanning candidate"
            );

            let eval = match evaluate_candidate(self.api.as_ref(), index, candidate).await {
                Evaluation::Priced(eval) => eval,
                Evaluation::Discarded(reason) => {
                    *summary.discarded.entry(reason.label()).or_default() += 1;
                    continue;
                }
            };
            summary.priced += 1;

            if !eval.is_profitable() {
                continue;
            }
            summary.profitable += 1;
            info!(
                set = %eval.set_name,
                profit = eval.profit,
                cost = eval.total_component_cost,
                trades = eval.trade_count,
                "Profitable set found"
            );

            insert_ranked(&mut results, eval);
            progress(results.clone());
        }

        info!(
            catalog = summary.catalog_size,
            candidates = summary.candidates,
            priced = summary.priced,
            profitable = summary.profitable,
            discarded = summary.total_discarded(),
            breakdown = ?summary.discarded,
            client = %self.api.stats(),
            "Scan complete"
        );

        results
    }
}

/// Insert keeping ascending `total_component_cost`; equal costs keep
/// discovery order.
fn insert_ranked(results: &mut Vec<SetEvaluation>, eval: SetEvaluation) {
    let pos = results.partition_point(|r| r.total_component_cost <= eval.total_component_cost);
    results.insert(pos, eval);
    debug_assert!(is_sorted_by_cost(results));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
