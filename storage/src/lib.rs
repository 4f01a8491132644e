//! `storefront-storage`: durable key-value storage for the storefront state stores.
//!
//! The cart and inventory persist themselves as JSON blobs under fixed
//! string keys. This crate provides the storage side of that:
//!
//! - `KvStore`: get/set/remove over string keys and values
//! - `MemStore`: in-memory `KvStore` for tests and previews
//! - `FileStore`: one file per key, atomic replace on write
//! - `StorageConfig`: where the `FileStore` lives
//! - `StorageError`: error type shared by all backends

pub mod error;
pub mod types;
pub mod kv_store;
pub mod mem_store;
pub mod file_store;

// Re-export commonly used types at the crate root.
pub use error::StorageError;
pub use types::StorageConfig;
pub use kv_store::{check_key, KvStore, MAX_KEY_LEN};
pub use mem_store::MemStore;
pub use file_store::FileStore;
