// orderflow/src/model/product.rs

use super::ProductId;
use serde::{Deserialize, Serialize};

/// A catalog product as returned by the remote product service.
///
/// Request-scoped: fetched, mutated in memory, pushed back, never stored locally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
  pub id: ProductId,
  /// Master whose stock pool this variant draws from. The catalog sends `0`
  /// for "no master".
  #[serde(rename = "product_id", default)]
  pub master_product_id: Option<ProductId>,
  #[serde(default)]
  pub name: String,
  pub price: f64,
  pub available_stock: i64,
  pub total_sell: i64,
}

impl Product {
  pub fn master_id(&self) -> Option<ProductId> {
    self.master_product_id.filter(|id| *id > 0)
  }
}

/// Plain acknowledgement body returned by the catalog's write endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Message {
  #[serde(default)]
  pub message: String,
}
