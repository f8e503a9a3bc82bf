//! Dashboard configuration loaded from a JSON file.

use crate::data::{DataSource, DatePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.json";
pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Config lists no data sources")]
    NoSources,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    pub sources: Vec<DataSource>,
    #[serde(default)]
    pub date_policy: DatePolicy,
    /// How many companies are preselected when the markets change.
    #[serde(default = "default_company_count")]
    pub default_company_count: usize,
}

fn default_title() -> String {
    "Global Stock Trading Dashboard".to_string()
}

fn default_company_count() -> usize {
    3
}

impl DashboardConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: DashboardConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        // Relative data paths are resolved against the config file's directory.
        if let Some(base) = path.parent() {
            for source in &mut config.sources {
                source.rebase(base);
            }
        }
        Ok(config)
    }

    /// Path from `DASHBOARD_CONFIG`, falling back to the default location.
    pub fn resolve_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

impl DataSource {
    fn rebase(&mut self, base: &Path) {
        let path = match self {
            DataSource::PerMarket { path, .. } | DataSource::Combined { path } => path,
        };
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}
