//! Module configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the ladder that must always exist.
pub const DEFAULT_LADDER: &str = "default";

/// Configuration for the ranks module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RanksConfig {
    /// Data root for the record store (ladders, players, and the journal nest
    /// under it)
    pub data_dir: PathBuf,
    /// Name of the mandatory bootstrap ladder
    pub default_ladder: String,
}

impl Default for RanksConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            default_ladder: DEFAULT_LADDER.to_string(),
        }
    }
}

impl RanksConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;

        if config.default_ladder.is_empty() {
            return Err(Error::Config("default_ladder must not be empty".to_string()));
        }
        Ok(config)
    }
}
