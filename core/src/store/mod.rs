// orderflow/src/store/mod.rs

//! Persistence ports for orders and order lines.
//!
//! The workflow only needs simple create/update/find/bulk-upsert calls; the
//! database adapter behind them is supplied by the host application.
//! [`MemoryStore`] implements both ports in memory.

pub mod memory;

pub use memory::MemoryStore;

use crate::model::{Order, OrderFilter, OrderId, OrderLine, Page};
use async_trait::async_trait;

/// Store failures are opaque to the workflow, which classifies every one of
/// them as a persistence failure.
pub type StoreResult<T> = anyhow::Result<T>;

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Inserts `order` and writes the assigned id back into it.
  async fn create(&self, order: &mut Order) -> StoreResult<()>;

  /// Overwrites the stored order's scalar fields (not its lines).
  async fn update(&self, order: &Order) -> StoreResult<()>;

  /// Live (not soft-deleted) order with its live lines preloaded.
  async fn find_by_id(&self, id: OrderId) -> StoreResult<Option<Order>>;

  /// Live orders of `filter.owner_id`, newest first, lines preloaded.
  async fn find_page(&self, filter: &OrderFilter) -> StoreResult<Page<Order>>;
}

#[async_trait]
pub trait OrderLineStore: Send + Sync {
  /// Inserts lines with `id == 0` (assigning ids in place) and overwrites the
  /// rest, matching on `unique_key`, in chunks of `batch_size`.
  async fn bulk_upsert(&self, unique_key: &str, batch_size: usize, lines: &mut [OrderLine]) -> StoreResult<()>;

  /// Live lines of one order.
  async fn find_all_by_order_id(&self, order_id: OrderId) -> StoreResult<Vec<OrderLine>>;
}
