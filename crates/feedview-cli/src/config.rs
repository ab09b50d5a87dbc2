//! `--config` file handling.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use feedview_store::StoreConfig;
use feedview_tree::RootPolicy;
use serde::{Deserialize, Serialize};

/// Environment variable holding a tracing filter (e.g. `feedview_store=debug`).
pub const LOG_ENV: &str = "FEEDVIEW_LOG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Tracing filter used when `FEEDVIEW_LOG` is unset.
    pub log_filter: Option<String>,
    pub store: StoreConfig,
    pub root_policy: RootPolicy,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn log_filter(&self, verbose: bool) -> String {
        if verbose {
            return "debug".to_string();
        }
        std::env::var(LOG_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.log_filter.clone())
            .unwrap_or_else(|| "warn".to_string())
    }
}
