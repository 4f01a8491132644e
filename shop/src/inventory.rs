//! Inventory store: the list of purchasable items.
//!
//! The inventory is seeded once with three default pets when nothing is
//! persisted, then grows through `add_item`, `add_random_item`, and
//! `merge_remote`. Every successful mutation rewrites the full list under
//! the inventory key; newest store-created items come first.
//!
//! A failed write does not roll the in-memory list back. The error is
//! returned, the store is marked dirty, and the next successful write (any
//! mutation or [`InventoryStore::flush`]) brings disk back in line.

use std::collections::HashSet;
use std::sync::Arc;

use storefront_storage::KvStore;
use tracing::{debug, info};

use crate::blob::Blob;
use crate::config::ShopConfig;
use crate::error::ShopResult;
use crate::ids::{Clock, IdGenerator, SystemClock};
use crate::item::{Item, ItemDraft, RemoteItem};
use crate::price::Price;

/// Items written on first launch, when no inventory is persisted.
pub fn default_items() -> Vec<Item> {
    vec![
        Item::new(
            "1",
            ItemDraft::new("Max", "Golden Retriever", Price::from_units(1200))
                .with_age(2)
                .with_image("https://images.dog.ceo/breeds/retriever-golden/n02099601_100.jpg"),
        ),
        Item::new(
            "2",
            ItemDraft::new("Bella", "German Shepherd", Price::from_units(1500))
                .with_age(3)
                .with_image("https://images.dog.ceo/breeds/germanshepherd/n02106662_1331.jpg"),
        ),
        Item::new(
            "3",
            ItemDraft::new("Charlie", "Labrador", Price::from_units(1100))
                .with_age(1)
                .with_image("https://images.dog.ceo/breeds/labrador/n02099712_3723.jpg"),
        ),
    ]
}

/// Where a new item's fields came from. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provenance {
    Form,
    Random,
}

/// Owned inventory state, read through from and written through to a
/// [`KvStore`].
#[derive(Debug)]
pub struct InventoryStore {
    blob: Blob,
    items: Vec<Item>,
    ids: IdGenerator,
    clock: Arc<dyn Clock>,
}

impl InventoryStore {
    /// Create an empty store persisting under `key`. Call
    /// [`init`](Self::init) before reading.
    pub fn new(storage: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            blob: Blob::new(storage, key),
            items: Vec::new(),
            ids: IdGenerator::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a store using the configured inventory key.
    pub fn from_config(storage: Arc<dyn KvStore>, config: &ShopConfig) -> Self {
        Self::new(storage, config.inventory_key.clone())
    }

    /// Replace the clock used for ids and creation timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Load the persisted list, seeding the defaults when none exists.
    ///
    /// Always reads storage. A malformed blob is reported and leaves the
    /// in-memory list untouched; defaults are only used when the key is
    /// absent. When seeding, the defaults are adopted even if writing them
    /// fails (the store is then dirty).
    pub fn init(&mut self) -> ShopResult<()> {
        match self.blob.load::<Vec<Item>>()? {
            Some(items) => {
                info!(key = self.blob.key(), count = items.len(), "inventory loaded");
                self.items = items;
                Ok(())
            }
            None => {
                info!(key = self.blob.key(), "no persisted inventory, seeding defaults");
                self.items = default_items();
                self.persist()
            }
        }
    }

    /// Create an item from user-entered fields. See [`add_random_item`](Self::add_random_item).
    pub fn add_item(&mut self, draft: ItemDraft) -> ShopResult<Item> {
        self.insert_new(draft, Provenance::Form)
    }

    /// Create an item from fields assembled around a fetched random image.
    ///
    /// The new item gets a fresh id and creation time and is prepended. On a
    /// failed write the item stays in memory and the error is returned.
    pub fn add_random_item(&mut self, draft: ItemDraft) -> ShopResult<Item> {
        self.insert_new(draft, Provenance::Random)
    }

    fn insert_new(&mut self, draft: ItemDraft, provenance: Provenance) -> ShopResult<Item> {
        let at = self.clock.now();
        let id = self.fresh_id(at);
        let item = Item::created(id, draft, at);
        debug!(id = item.id(), ?provenance, "adding inventory item");

        self.items.insert(0, item.clone());
        self.persist()?;
        Ok(item)
    }

    fn fresh_id(&mut self, at: chrono::DateTime<chrono::Utc>) -> String {
        loop {
            let id = self.ids.next_id(at);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Merge records fetched from the remote catalog.
    ///
    /// Records without an id get one synthesized from the current time.
    /// Records whose id is already present are skipped; the local copy is
    /// kept as is. New records are appended in remote order and the list is
    /// written once if anything was added. Returns the number added.
    pub fn merge_remote(&mut self, remote: Vec<RemoteItem>) -> ShopResult<usize> {
        let mut known: HashSet<String> = self.items.iter().map(|i| i.id().to_string()).collect();
        let mut added = 0;

        for record in remote {
            let item = match record.id {
                Some(id) => Item::new(id, record.draft),
                None => {
                    let at = self.clock.now();
                    let id = self.fresh_id(at);
                    Item::created(id, record.draft, at)
                }
            };
            if !known.insert(item.id().to_string()) {
                debug!(id = item.id(), "remote item already in inventory, skipping");
                continue;
            }
            self.items.push(item);
            added += 1;
        }

        if added > 0 {
            info!(added, total = self.items.len(), "merged remote items");
            self.persist()?;
        }
        Ok(added)
    }

    /// Remove the persisted list, then empty the in-memory one. On a
    /// failed remove the items are kept.
    pub fn clear(&mut self) -> ShopResult<()> {
        self.blob.remove()?;
        self.items.clear();
        Ok(())
    }

    /// Rewrite the list if a previous write failed. No-op otherwise.
    pub fn flush(&mut self) -> ShopResult<()> {
        if self.blob.is_dirty() {
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&mut self) -> ShopResult<()> {
        self.blob.save(&self.items)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when memory holds changes the last write failed to persist.
    pub fn is_dirty(&self) -> bool {
        self.blob.is_dirty()
    }
}
