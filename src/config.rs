//! Settings for the guidance backend and the event loop
//!
//! Layered: defaults, then `~/.formaid/config.json`, then environment,
//! then command line flags (applied by the caller).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::guidance::GuidanceClient;
use crate::interpreter::DEFAULT_PANEL_ID;
use crate::session::GuidanceMode;

pub const API_URL_ENV: &str = "FORMAID_API_URL";
pub const DEFAULT_FORM_CONTEXT: &str = "passport_application";

/// Debounce range that keeps the panel responsive without flooding the backend
const DEBOUNCE_RANGE_MS: std::ops::RangeInclusive<u64> = 300..=500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Guidance API root, e.g. `http://localhost:5000/api`
    pub api_url: Option<String>,
    pub form_context: String,
    pub mode: GuidanceMode,
    pub debounce_ms: u64,
    pub timeout_secs: u64,
    pub panel_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            form_context: DEFAULT_FORM_CONTEXT.to_string(),
            mode: GuidanceMode::Assisted,
            debounce_ms: 300,
            timeout_secs: 30,
            panel_id: DEFAULT_PANEL_ID.to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Unable to determine home directory")?;
        Ok(home_dir.join(".formaid").join("config.json"))
    }

    /// Defaults overlaid with the config file (if present) and environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Config = serde_json::from_str(&json)
                .with_context(|| format!("Invalid config file {}", path.display()))?;
            debug!("Loaded config from {}", path.display());
            config
        } else {
            Config::default()
        };

        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api_url = Some(url.trim().to_string());
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn debounce(&self) -> Duration {
        if !DEBOUNCE_RANGE_MS.contains(&self.debounce_ms) {
            warn!(
                "debounce_ms {} is outside {}-{}ms",
                self.debounce_ms,
                DEBOUNCE_RANGE_MS.start(),
                DEBOUNCE_RANGE_MS.end()
            );
        }
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// HTTP client for the configured endpoint, if any
    pub fn client(&self) -> Result<Option<GuidanceClient>> {
        self.api_url
            .as_deref()
            .map(|url| GuidanceClient::new(url, self.timeout()))
            .transpose()
    }
}
