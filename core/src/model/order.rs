// orderflow/src/model/order.rs

use super::{OrderId, OrderLine, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of every generated order number.
pub const ORDER_NUMBER_PREFIX: &str = "OD";

/// `chrono` layout appended to [`ORDER_NUMBER_PREFIX`]: creation time down to milliseconds.
pub const ORDER_NUMBER_TIME_FORMAT: &str = "%Y%m%d%H%M%S%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  #[default]
  Draft,
  Pending,
  Paid,
  Shipped,
  Delivered,
  Cancelled,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Order {
  pub id: OrderId,
  pub order_number: String,
  pub address_id: String,
  pub net_price: f64,
  pub discount: f64,
  pub shipping_price: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tracking_code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub voucher_id: Option<u64>,
  pub status: OrderStatus,
  pub total_price: f64,
  pub total_quantity: i64,
  pub created_by_user_id: UserId,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_by_user_id: Option<UserId>,
  #[serde(default)]
  pub order_lines: Vec<OrderLine>,
}

impl Order {
  /// `<prefix><created_at in ORDER_NUMBER_TIME_FORMAT>`.
  pub fn generate_order_number(created_at: DateTime<Utc>) -> String {
    format!("{}{}", ORDER_NUMBER_PREFIX, created_at.format(ORDER_NUMBER_TIME_FORMAT))
  }

  pub fn is_deleted(&self) -> bool {
    self.deleted_at.is_some()
  }

  pub fn mark_deleted(&mut self, at: DateTime<Utc>, by_user_id: UserId) {
    self.deleted_at = Some(at);
    self.deleted_by_user_id = Some(by_user_id);
    self.updated_at = at;
  }

  /// Adds one line's contribution to the order totals. The quantity total
  /// saturates instead of wrapping.
  pub fn accumulate(&mut self, line: &OrderLine) {
    self.total_price += line.line_total();
    self.total_quantity = self.total_quantity.saturating_add(line.quantity);
  }
}
