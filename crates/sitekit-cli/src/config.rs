//! `sitekit.toml` configuration.
//!
//! Precedence for every setting: command-line flag, then `SITEKIT_*`
//! environment variable (both resolved by clap), then the config file, then
//! the built-in default.

use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "sitekit.toml";
pub const DEFAULT_INVENTORY_PATH: &str = ".sitekit/inventory.jsonl";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InventorySection {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitekitConfig {
    pub inventory: InventorySection,
    pub logging: LoggingSection,
}

impl SitekitConfig {
    pub fn parse(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }

    /// Load an explicit config path, or `sitekit.toml` when present.
    pub fn load(explicit: Option<&str>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => PathBuf::from(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        Self::load_path(&path)
    }

    fn load_path(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
        Self::parse(&raw).map_err(|e| format!("invalid config {}: {e}", path.display()))
    }

    pub fn inventory_path(&self, flag: Option<String>) -> PathBuf {
        PathBuf::from(
            flag.or_else(|| self.inventory.path.clone())
                .unwrap_or_else(|| DEFAULT_INVENTORY_PATH.to_string()),
        )
    }

    pub fn log_filter(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.logging.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }

    pub fn log_format(&self, flag: Option<LogFormat>) -> LogFormat {
        flag.or(self.logging.format).unwrap_or_default()
    }
}
