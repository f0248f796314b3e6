// orderflow/src/model/request.rs

use super::{ProductId, UserId};
use serde::{Deserialize, Serialize};

/// Default `Accept-Language` forwarded to the catalog when the caller sent none.
pub const DEFAULT_LANGUAGE: &str = "th";

/// Caller identity and language preference for one workflow call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowContext {
  pub user_id: UserId,
  pub language: String,
}

impl WorkflowContext {
  pub fn new(user_id: UserId, language: impl Into<String>) -> Self {
    let language = language.into();
    Self {
      user_id,
      language: if language.is_empty() { DEFAULT_LANGUAGE.to_string() } else { language },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRequest {
  pub product_id: ProductId,
  pub quantity: i64,
}

/// Payload of a create-order call.
///
/// Totals are not part of the payload: they are always computed from the
/// catalog prices at validation time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreateOrderRequest {
  pub address_id: String,
  #[serde(default)]
  pub net_price: f64,
  #[serde(default)]
  pub discount: f64,
  #[serde(default)]
  pub shipping_price: f64,
  #[serde(default)]
  pub tracking_code: Option<String>,
  #[serde(default)]
  pub voucher_id: Option<u64>,
  pub order_lines: Vec<OrderLineRequest>,
}

impl CreateOrderRequest {
  /// Distinct product ids, in first-seen order.
  pub fn product_ids(&self) -> Vec<ProductId> {
    let mut ids = Vec::with_capacity(self.order_lines.len());
    for line in &self.order_lines {
      if !ids.contains(&line.product_id) {
        ids.push(line.product_id);
      }
    }
    ids
  }
}
