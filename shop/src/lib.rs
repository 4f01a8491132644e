//! `storefront-shop`: cart and inventory state for the storefront apps.
//!
//! This crate holds the state the restaurant and pet-marketplace apps keep
//! on the device, and the flows around it:
//!
//! - **Inventory:** the purchasable items, seeded with defaults on first launch
//! - **Cart:** entries unique per item id, quantity never below 1, total derived
//! - **Persistence:** each collection is one JSON blob, rewritten on every mutation
//! - **Catalog:** the remote item list, random image, and submit endpoints
//! - **Validation:** field-level checks for the pet upload form
//!
//! The primary entry point is [`Storefront`]; the stores can also be used on
//! their own.

pub mod error;
pub mod config;
pub mod price;
pub mod ids;
pub mod item;
pub mod blob;
pub mod inventory;
pub mod cart;
pub mod catalog;
pub mod validation;
pub mod storefront;

pub use error::{RemoteOp, ShopError, ShopResult};
pub use config::ShopConfig;
pub use price::Price;
pub use item::{Item, ItemDraft, RemoteItem};
pub use inventory::InventoryStore;
pub use cart::{CartEntry, CartStore};
pub use catalog::{Catalog, HttpCatalog, StaticCatalog, SubmitReceipt, SubmitRecord};
pub use validation::{validate_pet_form, PetForm, ValidationErrors};
pub use storefront::{CheckoutSummary, Storefront};
