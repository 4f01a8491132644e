//! Key-value storage abstraction for the storefront state stores.
//!
//! `KvStore` is the durable, string-keyed store the cart and inventory
//! read through at `init` and write through on every mutation. Values are
//! opaque strings (the stores put JSON blobs in them). There are no
//! transactions: each call stands alone.
//!
//! Implementations:
//! - `MemStore` (this crate): in-memory `BTreeMap`, for tests and previews
//! - `FileStore` (this crate): one file per key under a directory

use crate::error::StorageError;

/// Maximum key length in bytes accepted by [`check_key`].
pub const MAX_KEY_LEN: usize = 128;

/// Abstraction over durable string-keyed storage.
///
/// Methods take `&self` so one backend can be shared as
/// `Arc<dyn KvStore>` between the cart and the inventory.
pub trait KvStore: Send + Sync {
    /// Get the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a key that does not exist is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Check if a key exists.
    ///
    /// Default implementation uses `get()`, but backends may optimize this.
    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Validate a key for backends that map keys onto names in a namespace
/// (file names, for `FileStore`).
///
/// Accepted: non-empty, at most [`MAX_KEY_LEN`] bytes, only ASCII
/// alphanumerics and `_`, `-`, `.`, and not starting with `.`.
pub fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && !key.starts_with('.')
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
