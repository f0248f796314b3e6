// orderflow/src/error.rs

use crate::catalog::CatalogError;
use crate::model::{OrderId, ProductId, UserId};
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Errors raised by the pipeline engine itself rather than by step handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
  #[error("Handler missing for non-optional step '{step_name}' in pipeline '{pipeline}'")]
  HandlerMissing { pipeline: &'static str, step_name: String },

  #[error("Pipeline '{pipeline}' completed without producing {missing}")]
  MissingOutput { pipeline: &'static str, missing: &'static str },
}

/// Classified failure of an order workflow operation.
///
/// Presentation (status codes, localized messages) belongs to the caller;
/// this type only carries the classification and the ids involved.
#[derive(Debug, Error)]
pub enum OrderError {
  #[error("Out of stock: product {product_id} requested {requested}, available {available}")]
  OutOfStock {
    product_id: ProductId,
    requested: i64,
    available: i64,
  },

  #[error("Order not found: {order_id}")]
  NotFound { order_id: OrderId },

  #[error("User {user_id} is not allowed to access order {order_id}")]
  PermissionDenied { order_id: OrderId, user_id: UserId },

  #[error("Product not found in catalog: {product_id}")]
  ProductNotFound { product_id: ProductId },

  #[error("Invalid order request: {0}")]
  InvalidRequest(String),

  #[error("Catalog call '{operation}' failed: {source}")]
  UpstreamFailure {
    operation: &'static str,
    #[source]
    source: CatalogError,
  },

  #[error("Store call '{operation}' failed: {source}")]
  PersistenceFailure {
    operation: &'static str,
    #[source]
    source: AnyhowError,
  },

  #[error("Enrichment task failed: {0}")]
  Enrichment(#[from] tokio::task::JoinError),

  #[error("Workflow error: {0}")]
  Workflow(#[from] PipelineError),
}

pub type OrderResult<T, E = OrderError> = std::result::Result<T, E>;
