//! Directory-backed key-value store.
//!
//! Each key is one file, `<dir>/<key>.json`. Writes go to a sibling temp
//! file that is then renamed over the target, so a reader never sees a
//! half-written value. Keys are restricted by [`check_key`] so they are
//! always safe file names.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;
use crate::kv_store::{check_key, KvStore};
use crate::types::StorageConfig;

const VALUE_EXT: &str = "json";
const TEMP_EXT: &str = "json.tmp";

/// Durable store keeping one file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = dir.into();
        fs::create_dir_all(&root).map_err(|e| StorageError::io("<root>", e))?;
        debug!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    /// Open the store described by a [`StorageConfig`].
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::open(&config.data_dir)
    }

    /// Directory holding the value files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{VALUE_EXT}"))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{TEMP_EXT}"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        match fs::read(self.value_path(key)) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::Encoding(key.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let tmp = self.temp_path(key);
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, self.value_path(key))
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StorageError::io(key, e)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        check_key(key)?;
        Ok(self.value_path(key).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir(name: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "storefront-file-store-{}-{}-{}",
            name,
            std::process::id(),
            n
        ))
    }

    #[test]
    fn test_set_get_remove() {
        let dir = scratch_dir("basic");
        let store = FileStore::open(&dir).unwrap();

        assert_eq!(store.get("cart").unwrap(), None);
        store.set("cart", r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some(r#"[{"id":"1"}]"#));
        assert!(store.contains("cart").unwrap());
        assert!(dir.join("cart.json").is_file());
        assert!(!dir.join("cart.json.tmp").exists());

        store.remove("cart").unwrap();
        store.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_reopen_sees_previous_writes() {
        let dir = scratch_dir("reopen");
        FileStore::open(&dir).unwrap().set("pets", "[]").unwrap();

        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(reopened.get("pets").unwrap().as_deref(), Some("[]"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = scratch_dir("keys");
        let store = FileStore::open(&dir).unwrap();

        assert!(matches!(store.set("../escape", "x"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(store.get("a/b"), Err(StorageError::InvalidKey(_))));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_non_utf8_value_is_encoding_error() {
        let dir = scratch_dir("utf8");
        let store = FileStore::open(&dir).unwrap();
        fs::write(dir.join("cart.json"), [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(store.get("cart"), Err(StorageError::Encoding(_))));

        fs::remove_dir_all(&dir).unwrap();
    }
}
