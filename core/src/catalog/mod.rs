// orderflow/src/catalog/mod.rs

//! The remote product catalog as seen by the order workflow.
//!
//! Two calls, no business logic: look products up by id, and push a batch of
//! updated products back. [`HttpCatalogClient`] talks to the product service;
//! [`InMemoryCatalog`] stands in for it in tests, benches and demos.

pub mod http;
pub mod memory;

pub use http::HttpCatalogClient;
pub use memory::InMemoryCatalog;

use crate::model::{Message, Product, ProductId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("catalog request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("catalog responded with status {status}: {body}")]
  Status { status: u16, body: String },

  #[error("catalog response could not be decoded: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("catalog unavailable: {0}")]
  Unavailable(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Request/response boundary to the product catalog.
#[async_trait]
pub trait CatalogClient: Send + Sync {
  /// Fetches the current records for `ids`. Unknown ids are simply absent
  /// from the result. `language` is forwarded as `Accept-Language`.
  async fn lookup(&self, ids: &[ProductId], language: &str) -> CatalogResult<Vec<Product>>;

  /// Overwrites the catalog's copies of `products`. Safe to retry as a whole.
  async fn bulk_update(&self, products: &[Product], language: &str) -> CatalogResult<Message>;
}
