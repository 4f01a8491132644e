//! Storage configuration types.

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the on-device store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one file per key.
    /// Default: `./storefront-data`.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("storefront-data"),
        }
    }
}
