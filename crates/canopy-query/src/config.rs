//! Engine configuration.
//!
//! Loaded from TOML; every key is optional and falls back to the defaults
//! below.
//!
//! ```toml
//! bookkeeping_fields = ["type", "done", "queryLocator", "size"]
//! skip_leading_identity = true
//! max_subquery_depth = 1
//! parallel_pages = true
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Protocol-only node names stripped from every raw record
pub const DEFAULT_BOOKKEEPING_FIELDS: &[&str] = &[
    "type",
    "done",
    "queryLocator",
    "size",
    "totalSize",
    "nextRecordsUrl",
    "attributes",
];

/// Query engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Node names that never become result fields (matched exactly)
    pub bookkeeping_fields: Vec<String>,
    /// Drop the duplicated identity field the protocol puts first in every record
    pub skip_leading_identity: bool,
    /// How deep correlated sub-selects may nest
    pub max_subquery_depth: usize,
    /// Reshape multiple pages on the rayon pool
    pub parallel_pages: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bookkeeping_fields: DEFAULT_BOOKKEEPING_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_leading_identity: true,
            max_subquery_depth: 1,
            parallel_pages: true,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
