//! Storefront service: the stores wired to the remote catalog.
//!
//! `Storefront` is the single owned object an app constructs at startup and
//! hands to its screens. It carries out the flows the screens used to
//! orchestrate by hand: refresh the menu, add a random pet, submit the
//! upload form, add to cart, and check out.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use storefront_storage::KvStore;
use tracing::{debug, info, warn};

use crate::cart::CartStore;
use crate::catalog::{Catalog, SubmitRecord};
use crate::config::ShopConfig;
use crate::error::{ShopError, ShopResult};
use crate::ids::Clock;
use crate::inventory::InventoryStore;
use crate::item::{Item, ItemDraft};
use crate::price::Price;
use crate::validation::{validate_pet_form, PetForm};

const RANDOM_BREED: &str = "Mixed Breed";

/// One line of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// What was in the cart when it was checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub lines: Vec<CheckoutLine>,
    pub item_count: u32,
    pub total: Decimal,
}

/// Inventory, cart, and catalog behind one owner.
pub struct Storefront {
    inventory: InventoryStore,
    cart: CartStore,
    catalog: Arc<dyn Catalog>,
    submit_user_id: u64,
    rng: StdRng,
}

impl Storefront {
    /// Build the stores on `storage` with the configured keys. Call
    /// [`init`](Self::init) before use.
    pub fn new(config: &ShopConfig, storage: Arc<dyn KvStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            inventory: InventoryStore::from_config(storage.clone(), config),
            cart: CartStore::from_config(storage, config),
            catalog,
            submit_user_id: config.submit_user_id,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the clock used for new item ids.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.inventory = self.inventory.with_clock(clock);
        self
    }

    /// Seed the generator behind random pets.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Load both stores. Both are attempted; the first error is returned.
    pub fn init(&mut self) -> ShopResult<()> {
        let inventory = self.inventory.init();
        let cart = self.cart.init();
        inventory.and(cart)
    }

    pub fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut InventoryStore {
        &mut self.inventory
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    /// Fetch the remote item list and merge it into the inventory.
    /// Returns the number of items added.
    pub async fn refresh_menu(&mut self) -> ShopResult<usize> {
        let remote = self.catalog.fetch_items().await?;
        debug!(catalog = self.catalog.name(), count = remote.len(), "menu fetched");
        self.inventory.merge_remote(remote)
    }

    /// Fetch a random image URL, for prefilling the upload form.
    pub async fn random_image(&self) -> ShopResult<String> {
        self.catalog.fetch_random_image().await
    }

    /// Add a pet built around a random image.
    ///
    /// Named `Dog <n>` after the current inventory size, breed
    /// `Mixed Breed`, age 1..=10, price 500..=1499.
    pub async fn add_random_pet(&mut self) -> ShopResult<Item> {
        let image = self.catalog.fetch_random_image().await?;
        let draft = ItemDraft::new(
            format!("Dog {}", self.inventory.len() + 1),
            RANDOM_BREED,
            Price::from_units(self.rng.gen_range(500..=1499)),
        )
        .with_age(self.rng.gen_range(1..=10))
        .with_image(image);

        let item = self.inventory.add_random_item(draft)?;
        info!(id = item.id(), name = %item.name, "random pet added");
        Ok(item)
    }

    /// Validate the upload form, submit it remotely, then add the pet.
    ///
    /// Nothing is submitted when validation fails, and nothing is added
    /// when the submission fails. The inventory id is generated locally;
    /// the remote receipt id is only logged.
    pub async fn submit_pet(&mut self, form: &PetForm) -> ShopResult<Item> {
        let draft = validate_pet_form(form).map_err(|errors| {
            debug!(fields = errors.len(), "pet form rejected");
            ShopError::Validation(errors)
        })?;

        let record = SubmitRecord::for_pet(&draft, self.submit_user_id)?;
        let receipt = self.catalog.submit(&record).await?;
        debug!(remote_id = %receipt.id, "pet submission accepted");

        let item = self.inventory.add_item(draft)?;
        info!(id = item.id(), name = %item.name, "pet added");
        Ok(item)
    }

    /// Add one of the inventory item `id` to the cart. Returns its new
    /// quantity.
    pub fn add_to_cart(&mut self, id: &str) -> ShopResult<u32> {
        let item = self
            .inventory
            .get(id)
            .ok_or_else(|| ShopError::UnknownItem(id.to_string()))?;
        self.cart.add_to_cart(item)
    }

    /// Summarize and empty the cart. If the cart cannot be cleared the
    /// error is returned and the cart is left as it was, so checkout can be
    /// retried.
    pub fn checkout(&mut self) -> ShopResult<CheckoutSummary> {
        if self.cart.is_empty() {
            warn!("checkout requested with an empty cart");
            return Err(ShopError::EmptyCart);
        }

        let summary = CheckoutSummary {
            lines: self
                .cart
                .entries()
                .iter()
                .map(|e| CheckoutLine {
                    id: e.id().to_string(),
                    name: e.item().name.clone(),
                    quantity: e.quantity(),
                    line_total: e.line_total(),
                })
                .collect(),
            item_count: self.cart.item_count(),
            total: self.cart.total_price(),
        };
        self.cart.clear_cart()?;
        info!(items = summary.item_count, total = %summary.total, "checked out");
        Ok(summary)
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("inventory", &self.inventory)
            .field("cart", &self.cart)
            .field("catalog", &self.catalog.name())
            .finish()
    }
}
