//! JSON blobs under fixed keys.
//!
//! Both stores persist a whole collection as one JSON array under one key,
//! rewritten in full on every mutation. `Blob` owns that key, the shared
//! backend, and the dirty flag that records a failed write.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use storefront_storage::KvStore;
use tracing::{debug, error};

use crate::error::{ShopError, ShopResult};

/// One persisted collection.
pub struct Blob {
    storage: Arc<dyn KvStore>,
    key: String,
    dirty: bool,
}

impl Blob {
    pub fn new(storage: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            dirty: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when the last write or remove failed, so disk lags memory.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and decode the blob. `Ok(None)` when the key is absent.
    pub fn load<T: DeserializeOwned>(&self) -> ShopResult<Option<T>> {
        let text = match self.storage.get(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => return Ok(None),
            Err(e) => {
                error!(key = %self.key, error = %e, "failed to read persisted blob");
                return Err(e.into());
            }
        };
        serde_json::from_str(&text).map(Some).map_err(|source| {
            error!(key = %self.key, error = %source, "persisted blob is malformed");
            ShopError::Decode {
                key: self.key.clone(),
                source,
            }
        })
    }

    /// Encode `value` and replace the blob with it.
    pub fn save<T: Serialize + ?Sized>(&mut self, value: &T) -> ShopResult<()> {
        let result = serde_json::to_string(value)
            .map_err(ShopError::Encode)
            .and_then(|text| {
                self.storage.set(&self.key, &text)?;
                debug!(key = %self.key, bytes = text.len(), "blob written");
                Ok(())
            });
        self.settle(result, "failed to write blob")
    }

    /// Delete the blob.
    pub fn remove(&mut self) -> ShopResult<()> {
        let result = self.storage.remove(&self.key).map_err(ShopError::from);
        self.settle(result, "failed to remove blob")
    }

    fn settle(&mut self, result: ShopResult<()>, what: &str) -> ShopResult<()> {
        match result {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                error!(key = %self.key, error = %e, "{}", what);
                self.dirty = true;
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob")
            .field("key", &self.key)
            .field("dirty", &self.dirty)
            .finish()
    }
}
