//! Purchasable items: menu dishes and pets.
//!
//! The same record shape serves both apps. Menu payloads call the display
//! fields `title`/`subtitle`, pet payloads call them `name`/`breed`; both
//! spellings are accepted on decode and `name`/`breed` are written back.

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::price::Price;

/// A purchasable entity.
///
/// `id` is fixed at creation and is the only identity used for lookup,
/// update, and removal, so it is exposed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(deserialize_with = "id_from_string_or_number")]
    id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(alias = "subtitle", default)]
    pub breed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Build an item from a draft under an explicit id.
    pub fn new(id: impl Into<String>, draft: ItemDraft) -> Self {
        Self {
            id: id.into(),
            name: draft.name,
            breed: draft.breed,
            age: draft.age,
            price: draft.price,
            image: draft.image,
            created_at: None,
        }
    }

    /// Same as [`Item::new`], stamped with a creation time.
    pub fn created(id: impl Into<String>, draft: ItemDraft, at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(at),
            ..Self::new(id, draft)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Item fields supplied by a caller before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    #[serde(alias = "title")]
    pub name: String,
    #[serde(alias = "subtitle", default)]
    pub breed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub price: Price,
    #[serde(default)]
    pub image: String,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, breed: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            breed: breed.into(),
            age: None,
            price,
            image: String::new(),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

/// A record from the remote catalog. The id is optional on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteItem {
    #[serde(default, deserialize_with = "optional_id_from_string_or_number")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub draft: ItemDraft,
}

impl RemoteItem {
    pub fn new(id: Option<String>, draft: ItemDraft) -> Self {
        Self { id, draft }
    }
}

/// Ids show up as strings (mock APIs) or integers (jsonplaceholder).
fn optional_id_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    optional_id_from_string_or_number(deserializer)?
        .ok_or_else(|| D::Error::custom("item id is required"))
}

pub(crate) fn parse_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
