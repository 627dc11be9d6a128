//! SETSCAN: warframe.market set-assembly arbitrage scanner
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the rate-limited market client and the set-profit engine, then
//! either serves the dashboard until Ctrl+C or runs a single scan and
//! prints the ranked results.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use setscan::config::AppConfig;
use setscan::dashboard::{self, DashboardState};
use setscan::engine::SetProfitEngine;
use setscan::market::warframe::WarframeMarketClient;
use setscan::market::MarketApi;
use setscan::types::SetEvaluation;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("SETSCAN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    init_logging();

    info!(
        config = %config_path,
        base_url = %cfg.market.base_url,
        request_interval_ms = cfg.market.request_interval_ms,
        set_marker = %cfg.scanner.set_marker,
        "SETSCAN starting up"
    );

    let client: Arc<dyn MarketApi> = Arc::new(WarframeMarketClient::with_config(&cfg.market)?);
    let engine = SetProfitEngine::new(client, &cfg.scanner);

    if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState::new(engine));
        dashboard::serve(state, cfg.dashboard.port, shutdown_signal()).await?;
        info!("SETSCAN shut down cleanly.");
    } else {
        info!("Dashboard disabled, running a single scan");
        let results = engine
            .run_scan(|partial| info!(found = partial.len(), "Progress"))
            .await;
        print_results(&results);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Print the ranked results as a plain table on stdout.
fn print_results(results: &[SetEvaluation]) {
    if results.is_empty() {
        println!("No profitable sets found.");
        return;
    }

    println!(
        "{:<32} {:>8} {:>8} {:>8} {:>7}",
        "SET", "SELL", "COST", "PROFIT", "TRADES"
    );
    for r in results {
        println!(
            "{:<32} {:>8} {:>8} {:>8} {:>7}",
            r.set_name, r.set_sell_price, r.total_component_cost, r.profit, r.trade_count
        );
        for c in &r.components {
            println!("    {:<28} {c}", c.name);
        }
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("setscan=info"));

    let json_logging = std::env::var("SETSCAN_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
