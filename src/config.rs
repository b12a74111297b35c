//! Dashboard Configuration Module
//! Optional JSON settings with built-in defaults.

use crate::oee::{TimeBucket, WORLD_CLASS_OEE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "OEE_DASHBOARD_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "oee_dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("world_class_target must be in (0, 1], got {0}")]
    InvalidTarget(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Dataset loaded at startup when it exists.
    pub default_dataset: PathBuf,
    pub world_class_target: f64,
    /// Rows written to the download template.
    pub template_rows: usize,
    pub default_bucket: TimeBucket,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_dataset: PathBuf::from("oee_data.csv"),
            world_class_target: WORLD_CLASS_OEE,
            template_rows: 5,
            default_bucket: TimeBucket::Day,
            log_level: "info".to_string(),
            window_size: [1500.0, 950.0],
        }
    }
}

impl DashboardConfig {
    /// Resolve the config from `OEE_DASHBOARD_CONFIG`, then `oee_dashboard.json`, then defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }

        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!(path = %path.display(), "loaded dashboard config");
        Ok(config)
    }

    fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let target = self.world_class_target;
        if target > 0.0 && target <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidTarget(target))
        }
    }
}
