use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How element entries are stored inside the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

/// Settings for the undo history of new documents
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept, unbounded when absent
    pub limit: Option<usize>,
}

/// Settings for the export pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Fail the whole export when one element cannot be serialized
    pub strict: bool,
    pub compression: Compression,
    /// Allow several exports of the same document to run at once
    pub allow_concurrent_exports: bool,
    /// Number of background threads writing archives
    pub worker_threads: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            strict: false,
            compression: Compression::default(),
            allow_concurrent_exports: false,
            worker_threads: 2,
        }
    }
}

/// Top-level configuration, read from JSON
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history: HistoryConfig,
    pub export: ExportConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
