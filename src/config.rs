//! Configuration Management
//!
//! Persistent defaults for gcf-table, stored as JSON under the user config dir.

use crate::gcp::auth::{get_default_project, validate_project_id};
use crate::table::DEFAULT_CONCURRENCY;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Project to query when none is given on the command line
    #[serde(default)]
    pub project_id: Option<String>,
    /// Rows evaluated concurrently during a listing
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Override of the Cloud Functions API endpoint (emulators, proxies)
    #[serde(default)]
    pub api_endpoint: Option<String>,
    /// Columns selected when none are requested
    #[serde(default)]
    pub default_columns: Vec<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcf-table").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file {:?}: {:#}", path, e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Get effective project (CLI > config > gcloud default).
    ///
    /// The first configured source wins and must be a valid project id; an
    /// invalid value is an error, not a fallthrough to the next source.
    pub fn effective_project(&self, cli: Option<&str>) -> Result<Option<String>> {
        let configured = cli
            .map(|p| (p.trim().to_string(), "--project"))
            .or_else(|| self.project_id.clone().map(|p| (p, "config file")))
            .filter(|(p, _)| !p.is_empty());

        match configured {
            Some((project, source)) => {
                if !validate_project_id(&project) {
                    bail!("Invalid GCP project id '{}' from {}", project, source);
                }
                Ok(Some(project))
            }
            None => Ok(get_default_project()),
        }
    }

    /// Get effective row concurrency (CLI > config > default)
    pub fn effective_concurrency(&self, cli: Option<usize>) -> usize {
        cli.or(self.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY)
            .max(1)
    }

    /// Get effective column selection (CLI > config > all columns)
    pub fn effective_columns(&self, cli: &[String]) -> Vec<String> {
        if !cli.is_empty() {
            cli.to_vec()
        } else {
            self.default_columns.clone()
        }
    }

}
