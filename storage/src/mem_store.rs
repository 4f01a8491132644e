//! In-memory key-value store.
//!
//! `MemStore` implements `KvStore` using a `BTreeMap` behind an `RwLock`,
//! so it can be shared as `Arc<dyn KvStore>` like a real backend. Useful
//! for unit tests and for running the stores without touching disk.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::StorageError;
use crate::kv_store::KvStore;

/// In-memory store backed by `BTreeMap`.
///
/// BTreeMap keeps `snapshot()` output in key order, which keeps test
/// assertions stable.
#[derive(Debug, Default)]
pub struct MemStore {
    data: RwLock<BTreeMap<String, String>>,
}

impl MemStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with data.
    pub fn with_data(data: BTreeMap<String, String>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.data.read().map(|d| d.clone()).unwrap_or_default()
    }
}

fn poisoned() -> StorageError {
    StorageError::backend("memory store lock poisoned")
}

impl KvStore for MemStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        data.remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = MemStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(!store.contains("missing").unwrap());
    }

    #[test]
    fn test_set_and_get() {
        let store = MemStore::new();
        store.set("cart", "[]").unwrap();

        assert_eq!(store.get("cart").unwrap(), Some("[]".to_string()));
        assert!(store.contains("cart").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_overwrite() {
        let store = MemStore::new();
        store.set("pets", "v1").unwrap();
        store.set("pets", "v2").unwrap();

        assert_eq!(store.get("pets").unwrap(), Some("v2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_and_remove_missing() {
        let store = MemStore::new();
        store.set("cart", "[]").unwrap();
        store.remove("cart").unwrap();
        store.remove("cart").unwrap();

        assert_eq!(store.get("cart").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_with_data_and_snapshot() {
        let mut data = BTreeMap::new();
        data.insert("b".to_string(), "2".to_string());
        data.insert("a".to_string(), "1".to_string());

        let store = MemStore::with_data(data);
        let keys: Vec<_> = store.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
