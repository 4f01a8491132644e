//! Shop configuration.

use std::time::Duration;

use serde::Deserialize;
use storefront_storage::StorageConfig;

use crate::error::{ShopError, ShopResult};

/// Configuration for the stores and the remote catalog.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Storage key of the persisted cart.
    pub cart_key: String,

    /// Storage key of the persisted inventory.
    pub inventory_key: String,

    /// `GET` endpoint returning the item list.
    pub catalog_url: String,

    /// `GET` endpoint returning `{ "message": <image url> }`.
    pub random_image_url: String,

    /// `POST` endpoint accepting `{ title, body, userId }`.
    pub submit_url: String,

    /// HTTP request timeout in milliseconds.
    /// Default: 10 000.
    pub request_timeout_ms: u64,

    /// `userId` sent with submitted records.
    pub submit_user_id: u64,

    /// Where the file-backed store keeps its data.
    pub storage: StorageConfig,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            cart_key: "cart".to_string(),
            inventory_key: "pets".to_string(),
            catalog_url: "https://678895e22c874e66b7d58e7f.mockapi.io/api/v1/menu".to_string(),
            random_image_url: "https://dog.ceo/api/breeds/image/random".to_string(),
            submit_url: "https://jsonplaceholder.typicode.com/posts".to_string(),
            request_timeout_ms: 10_000,
            submit_user_id: 1,
            storage: StorageConfig::default(),
        }
    }
}

impl ShopConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> ShopResult<Self> {
        toml::from_str(text).map_err(|e| ShopError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
