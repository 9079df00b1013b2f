// src/services/catalog.rs

//! HTTP client for the external catalog service.
//!
//! The catalog is only consulted when an item is added to a cart; the
//! returned snapshot (price, title, image) is copied verbatim into the
//! line-item and never refreshed afterwards.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Catalog data captured at add-time.
#[derive(Debug, Clone, PartialEq)]
pub struct BookSnapshot {
  pub book_id: String,
  pub title: String,
  pub price: f64,
  pub image_url: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
  /// Transport failure or non-success HTTP status from the catalog service.
  #[error("catalog service unavailable: {0}")]
  Unavailable(String),

  /// The catalog answered, but the envelope reported failure or the item
  /// was missing required snapshot fields.
  #[error("catalog returned an invalid item: {0}")]
  InvalidItem(String),
}

/// Lookup seam so handlers can be exercised against a fake catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
  async fn book_by_id(&self, book_id: &str) -> Result<BookSnapshot, CatalogError>;
}

// Wire shapes: `GET {base}/{bookId}` answers
// `{success: bool, data: {_id, title, author, price, imageUrl, description}}`.
// Only the snapshot fields are kept; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct BookEnvelope {
  #[serde(default)]
  success: bool,
  data: Option<BookPayload>,
}

#[derive(Debug, Deserialize)]
struct BookPayload {
  title: Option<String>,
  price: Option<f64>,
  #[serde(rename = "imageUrl")]
  image_url: Option<String>,
}

fn snapshot_from_envelope(book_id: &str, envelope: BookEnvelope) -> Result<BookSnapshot, CatalogError> {
  if !envelope.success {
    return Err(CatalogError::InvalidItem(
      "catalog reported an unsuccessful lookup".to_string(),
    ));
  }

  let payload = envelope
    .data
    .ok_or_else(|| CatalogError::InvalidItem("catalog response is missing item data".to_string()))?;

  let title = payload
    .title
    .filter(|t| !t.is_empty())
    .ok_or_else(|| CatalogError::InvalidItem("catalog item is missing a title".to_string()))?;
  let price = payload
    .price
    .ok_or_else(|| CatalogError::InvalidItem("catalog item is missing a price".to_string()))?;
  let image_url = payload
    .image_url
    .ok_or_else(|| CatalogError::InvalidItem("catalog item is missing an image URL".to_string()))?;

  Ok(BookSnapshot {
    book_id: book_id.to_string(),
    title,
    price,
    image_url,
  })
}

/// HTTP implementation against the real catalog service.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
  base_url: String,
  http: Client,
}

impl HttpCatalogClient {
  /// `http` is the process-wide client; it carries the bounded request
  /// timeout configured at startup.
  pub fn new(base_url: impl Into<String>, http: Client) -> Self {
    Self {
      base_url: base_url.into(),
      http,
    }
  }
}

#[async_trait]
impl CatalogProvider for HttpCatalogClient {
  #[instrument(name = "catalog::book_by_id", skip(self))]
  async fn book_by_id(&self, book_id: &str) -> Result<BookSnapshot, CatalogError> {
    let url = format!("{}/{}", self.base_url, book_id);

    let response = self
      .http
      .get(&url)
      .send()
      .await
      .map_err(|e| CatalogError::Unavailable(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      return Err(CatalogError::Unavailable(format!(
        "catalog service returned status {status}"
      )));
    }

    let envelope: BookEnvelope = response
      .json()
      .await
      .map_err(|e| CatalogError::InvalidItem(format!("undecodable catalog response: {e}")))?;

    let snapshot = snapshot_from_envelope(book_id, envelope)?;
    debug!(title = %snapshot.title, price = snapshot.price, "catalog lookup succeeded");
    Ok(snapshot)
  }
}
