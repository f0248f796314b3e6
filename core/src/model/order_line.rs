// orderflow/src/model/order_line.rs

use super::{OrderId, OrderLineId, Product, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One product/quantity entry of an order.
///
/// `price` is the unit price captured when the order was created and is never
/// refreshed from the catalog. `product` is filled in by enrichment on read
/// paths and is not persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderLine {
  pub id: OrderLineId,
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub quantity: i64,
  pub price: f64,
  pub created_by_user_id: UserId,
  pub created_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_by_user_id: Option<UserId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub product: Option<Product>,
}

impl OrderLine {
  pub fn is_deleted(&self) -> bool {
    self.deleted_at.is_some()
  }

  pub fn mark_deleted(&mut self, at: DateTime<Utc>, by_user_id: UserId) {
    self.deleted_at = Some(at);
    self.deleted_by_user_id = Some(by_user_id);
  }

  pub fn line_total(&self) -> f64 {
    self.price * self.quantity as f64
  }
}
