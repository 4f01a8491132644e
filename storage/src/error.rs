//! Storage error types.
//!
//! `StorageError` is returned by every [`KvStore`](crate::KvStore) method.
//! Backends map their native failures (I/O, poisoned locks) onto it so the
//! state stores above only deal with one error type.

use std::io;

/// Error type returned by key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key is empty, too long, or contains characters the backend
    /// cannot represent.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    /// An I/O operation on the backing medium failed.
    #[error("i/o error on key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The stored bytes for a key are not valid UTF-8.
    #[error("value for key {0:?} is not valid UTF-8")]
    Encoding(String),

    /// Any other backend failure (poisoned lock, rejected write).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Create an I/O error tagged with the key being accessed.
    pub fn io(key: &str, source: io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }

    /// Create a backend error from any displayable message.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Returns true if the error came from the backing medium rather than
    /// from a bad key.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
