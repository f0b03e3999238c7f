use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Runtime settings: a TOML file overlaid with OLX_WATCH-prefixed
/// environment variables (e.g. OLX_WATCH_DISCORD__WEBHOOK_URL).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub discord: Discord,
    #[serde(default)]
    pub scraper: Scraper,
    /// Named search URLs, processed in name order.
    pub sources: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Discord {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scraper {
    #[serde(default)]
    pub scrape_details: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Scraper {
    fn default() -> Self {
        Self {
            scrape_details: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("OLX_WATCH").separator("__"))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?
            .try_deserialize()
            .context("Invalid config")?;
        Ok(settings)
    }
}

// ── Tests ──
