//! # Catalog Configuration
//!
//! Tunables for a `Catalog`, loadable from TOML.
//!
//! ```toml
//! min_buckets = 17
//! max_songs = 100000
//! max_genres = 5000
//! ```
//!
//! Every field is optional. The record limits model storage exhaustion:
//! an operation that would exceed one fails with `AllocationError`.

use crate::ConfigError;
use crate::primitives::INITIAL_BUCKETS;
use serde::{Deserialize, Serialize};

/// Configuration of a `Catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Initial bucket count and shrink floor of both key stores.
    pub min_buckets: usize,
    /// Maximum number of songs.
    pub max_songs: Option<usize>,
    /// Maximum number of live genre ids.
    pub max_genres: Option<usize>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            min_buckets: INITIAL_BUCKETS,
            max_songs: None,
            max_genres: None,
        }
    }
}

impl CatalogConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no catalog can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_buckets == 0 {
            return Err(ConfigError::Invalid(
                "min_buckets must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
