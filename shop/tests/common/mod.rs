//! Shared test helpers for integration tests.
//!
//! Provides item builders, a fixed clock, a store that can be told to fail,
//! a catalog that always fails, and scratch directories for `FileStore`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use storefront_shop::ids::FixedClock;
use storefront_shop::{
    Catalog, Item, ItemDraft, Price, RemoteItem, RemoteOp, ShopError, ShopResult, SubmitReceipt,
    SubmitRecord,
};
use storefront_storage::{KvStore, MemStore, StorageError};

/// Random image URL served by test catalogs.
pub const DOG_IMAGE: &str = "https://images.dog.ceo/breeds/hound-afghan/n02088094_1003.jpg";

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// ── Items ──

/// Item with whole-unit price.
pub fn item(id: &str, price: u64) -> Item {
    Item::new(
        id,
        ItemDraft::new(format!("Item {id}"), "Test", Price::from_units(price)),
    )
}

/// Item with a decimal price given as text.
pub fn item_priced(id: &str, price: &str) -> Item {
    Item::new(
        id,
        ItemDraft::new(format!("Item {id}"), "Test", price.parse().unwrap()),
    )
}

/// Menu record as the remote catalog returns it.
pub fn menu_record(id: Option<&str>, title: &str, price: u64) -> RemoteItem {
    RemoteItem::new(
        id.map(str::to_string),
        ItemDraft::new(title, "Menu", Price::from_units(price)),
    )
}

// ── Clock ──

/// Clock stuck at `millis` since the Unix epoch.
pub fn clock_at(millis: i64) -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.timestamp_millis_opt(millis).unwrap()))
}

// ── Storage ──

/// A `MemStore` whose reads and writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).unwrap()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.inner.set(key, value).unwrap();
    }
}

impl KvStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::backend("injected read failure"));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::backend("injected write failure"));
        }
        self.inner.set(key, value)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::backend("injected remove failure"));
        }
        self.inner.remove(key)
    }
}

/// Fresh per-test directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "storefront-shop-{}-{}-{}",
        name,
        std::process::id(),
        n
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

// ── Catalog ──

/// Catalog whose every call fails.
#[derive(Debug, Default)]
pub struct DownCatalog {
    pub calls: AtomicUsize,
}

impl DownCatalog {
    fn fail(&self, op: RemoteOp) -> ShopError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ShopError::remote(op, "connection refused")
    }
}

#[async_trait]
impl Catalog for DownCatalog {
    async fn fetch_items(&self) -> ShopResult<Vec<RemoteItem>> {
        Err(self.fail(RemoteOp::FetchItems))
    }

    async fn fetch_random_image(&self) -> ShopResult<String> {
        Err(self.fail(RemoteOp::FetchRandomImage))
    }

    async fn submit(&self, _record: &SubmitRecord) -> ShopResult<SubmitReceipt> {
        Err(self.fail(RemoteOp::Submit))
    }
}
