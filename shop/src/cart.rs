//! Cart store: selected items with quantities.
//!
//! Entries are unique per item id and always carry a quantity of at least 1.
//! The total is never stored: [`CartStore::total_price`] sums
//! `price * quantity` over the entries each time, so it cannot drift from
//! them, including after a reload.
//!
//! Per entry: absent -> 1 via add, n -> n + 1 via add, n -> max(1, q) via
//! update, present -> absent via remove or clear.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use storefront_storage::KvStore;
use tracing::{debug, info, warn};

use crate::blob::Blob;
use crate::config::ShopConfig;
use crate::error::ShopResult;
use crate::item::Item;

/// An item paired with its quantity.
///
/// Persisted as the item's fields plus `quantity`. A record without a
/// quantity (or with 0) decodes as quantity 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(flatten)]
    item: Item,
    #[serde(default = "one", deserialize_with = "at_least_one")]
    quantity: u32,
}

fn one() -> u32 {
    1
}

fn at_least_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(1).max(1))
}

impl CartEntry {
    fn new(item: Item) -> Self {
        Self { item, quantity: 1 }
    }

    pub fn id(&self) -> &str {
        self.item.id()
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price * quantity` for this entry.
    pub fn line_total(&self) -> Decimal {
        self.item.price.times(self.quantity)
    }
}

/// Owned cart state, read through from and written through to a
/// [`KvStore`].
#[derive(Debug)]
pub struct CartStore {
    blob: Blob,
    entries: Vec<CartEntry>,
}

impl CartStore {
    /// Create an empty cart persisting under `key`.
    pub fn new(storage: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            blob: Blob::new(storage, key),
            entries: Vec::new(),
        }
    }

    /// Create a cart using the configured cart key.
    pub fn from_config(storage: Arc<dyn KvStore>, config: &ShopConfig) -> Self {
        Self::new(storage, config.cart_key.clone())
    }

    /// Load the persisted cart.
    ///
    /// A missing blob means an empty cart. A malformed one is reported and
    /// the cart is left empty. Duplicate ids in a persisted blob are folded
    /// into one entry with the summed quantity.
    pub fn init(&mut self) -> ShopResult<()> {
        let loaded = self.blob.load::<Vec<CartEntry>>();
        self.entries.clear();
        let Some(entries) = loaded? else {
            debug!(key = self.blob.key(), "no persisted cart");
            return Ok(());
        };

        for entry in entries {
            match self.position(entry.id()) {
                Some(i) => {
                    warn!(id = entry.id(), "duplicate cart entry in persisted blob, merging");
                    let existing = &mut self.entries[i];
                    existing.quantity = existing.quantity.saturating_add(entry.quantity);
                }
                None => self.entries.push(entry),
            }
        }
        info!(
            key = self.blob.key(),
            entries = self.entries.len(),
            total = %self.total_price(),
            "cart loaded"
        );
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// Add one of `item`. Returns the entry's new quantity.
    ///
    /// The in-memory cart keeps the change even if persisting fails.
    pub fn add_to_cart(&mut self, item: &Item) -> ShopResult<u32> {
        let quantity = match self.position(item.id()) {
            Some(i) => {
                let entry = &mut self.entries[i];
                entry.quantity = entry.quantity.saturating_add(1);
                entry.quantity
            }
            None => {
                self.entries.push(CartEntry::new(item.clone()));
                1
            }
        };
        debug!(id = item.id(), quantity, "added to cart");
        self.persist()?;
        Ok(quantity)
    }

    /// Drop the entry for `id`. Returns false, without writing, if there
    /// was none.
    pub fn remove_from_cart(&mut self, id: &str) -> ShopResult<bool> {
        let Some(i) = self.position(id) else {
            return Ok(false);
        };
        self.entries.remove(i);
        debug!(id, "removed from cart");
        self.persist()?;
        Ok(true)
    }

    /// Set the quantity for `id` to `max(1, quantity)`.
    ///
    /// Quantity cannot reach zero this way; removal is the only path to
    /// absence. Returns the stored quantity, or `None` (no write) when `id`
    /// is not in the cart.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> ShopResult<Option<u32>> {
        let Some(i) = self.position(id) else {
            return Ok(None);
        };
        let clamped = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);
        self.entries[i].quantity = clamped;
        debug!(id, quantity = clamped, "cart quantity updated");
        self.persist()?;
        Ok(Some(clamped))
    }

    /// Delete the persisted blob, then empty the cart. On a failed
    /// delete the entries are kept.
    pub fn clear_cart(&mut self) -> ShopResult<()> {
        self.blob.remove()?;
        self.entries.clear();
        Ok(())
    }

    /// Rewrite the cart if a previous write failed. No-op otherwise.
    pub fn flush(&mut self) -> ShopResult<()> {
        if self.blob.is_dirty() {
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&mut self) -> ShopResult<()> {
        self.blob.save(&self.entries)
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Sum of `price * quantity` over all entries.
    pub fn total_price(&self) -> Decimal {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Sum of quantities.
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |n, e| n.saturating_add(e.quantity))
    }

    pub fn quantity_of(&self, id: &str) -> Option<u32> {
        self.position(id).map(|i| self.entries[i].quantity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when memory holds changes the last write failed to persist.
    pub fn is_dirty(&self) -> bool {
        self.blob.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDraft;
    use crate::price::Price;
    use rust_decimal_macros::dec;
    use storefront_storage::MemStore;

    fn item(id: &str, price: u64) -> Item {
        Item::new(id, ItemDraft::new(format!("Item {id}"), "", Price::from_units(price)))
    }

    fn cart() -> (Arc<MemStore>, CartStore) {
        let mem = Arc::new(MemStore::new());
        (mem.clone(), CartStore::new(mem, "cart"))
    }

    #[test]
    fn test_add_same_item_increments() {
        let (_mem, mut cart) = cart();
        let seven = item("7", 100);
        assert_eq!(cart.add_to_cart(&seven).unwrap(), 1);
        assert_eq!(cart.add_to_cart(&seven).unwrap(), 2);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("7"), Some(2));
        assert_eq!(cart.total_price(), dec!(200));
    }

    #[test]
    fn test_update_quantity_clamps_to_one() {
        let (_mem, mut cart) = cart();
        cart.add_to_cart(&item("7", 50)).unwrap();

        assert_eq!(cart.update_quantity("7", 0).unwrap(), Some(1));
        assert_eq!(cart.update_quantity("7", -3).unwrap(), Some(1));
        assert_eq!(cart.total_price(), dec!(50));
        assert_eq!(cart.update_quantity("7", i64::MAX).unwrap(), Some(u32::MAX));
    }

    #[test]
    fn test_update_missing_is_noop() {
        let (mem, mut cart) = cart();
        assert_eq!(cart.update_quantity("nope", 4).unwrap(), None);
        assert!(mem.is_empty());
    }

    #[test]
    fn test_remove_twice() {
        let (_mem, mut cart) = cart();
        cart.add_to_cart(&item("1", 10)).unwrap();
        cart.add_to_cart(&item("2", 20)).unwrap();

        assert!(cart.remove_from_cart("1").unwrap());
        assert!(!cart.remove_from_cart("1").unwrap());
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_price(), dec!(20));
    }

    #[test]
    fn test_clear_resets_total_and_blob() {
        let (mem, mut cart) = cart();
        cart.add_to_cart(&item("1", 10)).unwrap();
        cart.clear_cart().unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert!(!mem.contains("cart").unwrap());
    }

    #[test]
    fn test_entry_quantity_defaults_on_decode() {
        let entries: Vec<CartEntry> = serde_json::from_str(
            r#"[{"id":"1","name":"a","price":5},{"id":"2","name":"b","price":"2.5","quantity":0},{"id":"3","name":"c","price":1,"quantity":4}]"#,
        )
        .unwrap();
        let quantities: Vec<_> = entries.iter().map(CartEntry::quantity).collect();
        assert_eq!(quantities, vec![1, 1, 4]);
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = CartEntry::new(item("9", 3));
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["id"], "9");
        assert_eq!(v["quantity"], 1);
        assert_eq!(v["price"], 3);
    }

    #[test]
    fn test_init_folds_duplicate_ids() {
        let mem = Arc::new(MemStore::new());
        mem.set(
            "cart",
            r#"[{"id":"1","name":"a","price":5,"quantity":2},{"id":"1","name":"a","price":5,"quantity":3}]"#,
        )
        .unwrap();
        let mut cart = CartStore::new(mem, "cart");
        cart.init().unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("1"), Some(5));
        assert_eq!(cart.total_price(), dec!(25));
    }
}
