//! Configuration loading from TOML.
//!
//! Every setting has a built-in default matching the public
//! warframe.market service, so the scanner runs without any config file.
//! `config.toml` only needs the keys it wants to override.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub market: MarketConfig,
    pub scanner: ScannerConfig,
    pub dashboard: DashboardConfig,
}

/// Remote market endpoint and client identity.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketConfig {
    pub base_url: String,
    /// Minimum spacing between outbound requests.
    pub request_interval_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub platform: String,
    pub language: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.warframe.market/v2".into(),
            request_interval_ms: 340,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36"
                .into(),
            platform: "pc".into(),
            language: "en".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    /// Substring of the display name that marks a candidate set.
    pub set_marker: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            set_marker: "Prime Set".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 5000,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load configuration, falling back to defaults when the file is absent.
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
