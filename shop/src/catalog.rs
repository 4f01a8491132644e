//! Remote catalog client.
//!
//! Three endpoints are consumed, each as an opaque request/response
//! contract:
//!
//! - `GET <catalog_url>` returns the item list (no pagination, no auth)
//! - `GET <random_image_url>` returns `{ "message": <url>, "status": "success" }`
//! - `POST <submit_url>` with `{ title, body, userId }` echoes a record id
//!
//! Failures come back as [`ShopError::Remote`]. There is no retry, no
//! backoff, and no timeout other than the HTTP client's.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ShopConfig;
use crate::error::{RemoteOp, ShopError, ShopResult};
use crate::item::{parse_id, ItemDraft, RemoteItem};
use crate::price::Price;

/// Source of remote items, images, and submissions.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the full item list.
    async fn fetch_items(&self) -> ShopResult<Vec<RemoteItem>>;

    /// Fetch the URL of a random image.
    async fn fetch_random_image(&self) -> ShopResult<String>;

    /// Submit a record. The returned id is informational only.
    async fn submit(&self, record: &SubmitRecord) -> ShopResult<SubmitReceipt>;

    /// Returns a name for this catalog (used in logging).
    fn name(&self) -> &str {
        "Catalog"
    }
}

/// Body of a create-record request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRecord {
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

#[derive(Serialize)]
struct PetBody<'a> {
    breed: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    price: Price,
    image: &'a str,
}

impl SubmitRecord {
    /// Record describing a pet: the name as title, the rest JSON-encoded
    /// in the body.
    pub fn for_pet(draft: &ItemDraft, user_id: u64) -> ShopResult<Self> {
        let body = serde_json::to_string(&PetBody {
            breed: &draft.breed,
            age: draft.age,
            price: draft.price,
            image: &draft.image,
        })
        .map_err(ShopError::Encode)?;
        Ok(Self {
            title: draft.name.clone(),
            body,
            user_id,
        })
    }
}

/// Response to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub id: String,
}

#[derive(Deserialize)]
struct RandomImageResponse {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    id: serde_json::Value,
}

fn image_from_response(response: RandomImageResponse) -> ShopResult<String> {
    match response.status.as_deref() {
        None | Some("success") => Ok(response.message),
        Some(status) => Err(ShopError::remote(
            RemoteOp::FetchRandomImage,
            format!("status {status:?}: {}", response.message),
        )),
    }
}

fn receipt_from_response(response: SubmitResponse) -> ShopResult<SubmitReceipt> {
    parse_id(&response.id)
        .map(|id| SubmitReceipt { id })
        .ok_or_else(|| ShopError::remote(RemoteOp::Submit, "response has no id"))
}

/// Catalog backed by HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    catalog_url: String,
    random_image_url: String,
    submit_url: String,
}

impl HttpCatalog {
    /// Build a client with JSON headers and the configured timeout.
    pub fn new(config: &ShopConfig) -> ShopResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ShopError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            catalog_url: config.catalog_url.clone(),
            random_image_url: config.random_image_url.clone(),
            submit_url: config.submit_url.clone(),
        })
    }

    async fn read_json<T: DeserializeOwned>(
        op: RemoteOp,
        request: reqwest::RequestBuilder,
    ) -> ShopResult<T> {
        let fail = |e: reqwest::Error| {
            warn!(%op, error = %e, "remote call failed");
            ShopError::remote(op, e.to_string())
        };
        let response = request.send().await.map_err(fail)?;
        let response = response.error_for_status().map_err(fail)?;
        response.json::<T>().await.map_err(fail)
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn fetch_items(&self) -> ShopResult<Vec<RemoteItem>> {
        let items: Vec<RemoteItem> =
            Self::read_json(RemoteOp::FetchItems, self.client.get(&self.catalog_url)).await?;
        debug!(count = items.len(), url = %self.catalog_url, "fetched catalog items");
        Ok(items)
    }

    async fn fetch_random_image(&self) -> ShopResult<String> {
        let response: RandomImageResponse = Self::read_json(
            RemoteOp::FetchRandomImage,
            self.client.get(&self.random_image_url),
        )
        .await?;
        image_from_response(response)
    }

    async fn submit(&self, record: &SubmitRecord) -> ShopResult<SubmitReceipt> {
        let response: SubmitResponse = Self::read_json(
            RemoteOp::Submit,
            self.client.post(&self.submit_url).json(record),
        )
        .await?;
        let receipt = receipt_from_response(response)?;
        debug!(id = %receipt.id, "record submitted");
        Ok(receipt)
    }

    fn name(&self) -> &str {
        "HttpCatalog"
    }
}

/// A catalog answering from fixed data. Records every submission.
///
/// Useful for previews without network access and for tests.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    items: Vec<RemoteItem>,
    image: String,
    receipt_id: String,
    submissions: Mutex<Vec<SubmitRecord>>,
}

impl StaticCatalog {
    pub fn new(items: Vec<RemoteItem>, image: impl Into<String>) -> Self {
        Self {
            items,
            image: image.into(),
            receipt_id: "101".to_string(),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Id returned by `submit`.
    pub fn with_receipt_id(mut self, id: impl Into<String>) -> Self {
        self.receipt_id = id.into();
        self
    }

    /// Records submitted so far, in order.
    pub fn submissions(&self) -> Vec<SubmitRecord> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn fetch_items(&self) -> ShopResult<Vec<RemoteItem>> {
        Ok(self.items.clone())
    }

    async fn fetch_random_image(&self) -> ShopResult<String> {
        Ok(self.image.clone())
    }

    async fn submit(&self, record: &SubmitRecord) -> ShopResult<SubmitReceipt> {
        self.submissions
            .lock()
            .map_err(|_| ShopError::remote(RemoteOp::Submit, "submission log poisoned"))?
            .push(record.clone());
        Ok(SubmitReceipt {
            id: self.receipt_id.clone(),
        })
    }

    fn name(&self) -> &str {
        "StaticCatalog"
    }
}
