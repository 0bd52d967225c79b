//! Recstore configuration
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional
//! YAML file, `RECSTORE_*` environment variables, then CLI flags.

use recstore_persistence::StorageConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_STORAGE_PATH: &str = "RECSTORE_STORAGE_PATH";
pub const ENV_ATOMIC_WRITES: &str = "RECSTORE_ATOMIC_WRITES";
pub const ENV_SERIALIZE_WRITES: &str = "RECSTORE_SERIALIZE_WRITES";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecstoreConfig {
    /// Record store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl RecstoreConfig {
    /// Load a YAML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Apply `RECSTORE_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any variable lookup; unset or unparsable values are skipped
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_STORAGE_PATH).filter(|p| !p.trim().is_empty()) {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(flag) = lookup(ENV_ATOMIC_WRITES).and_then(|v| parse_flag(&v)) {
            self.storage.atomic_writes = flag;
        }
        if let Some(flag) = lookup(ENV_SERIALIZE_WRITES).and_then(|v| parse_flag(&v)) {
            self.storage.serialize_writes = flag;
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
