// orderflow/src/store/memory.rs

use super::{OrderLineStore, OrderStore, StoreResult};
use crate::model::{Order, OrderFilter, OrderId, OrderLine, OrderLineId, Page, PageInformation};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::trace;

#[derive(Default)]
struct State {
  orders: BTreeMap<OrderId, Order>,
  lines: BTreeMap<OrderLineId, OrderLine>,
  next_order_id: OrderId,
  next_line_id: OrderLineId,
}

impl State {
  fn live_lines_of(&self, order_id: OrderId) -> Vec<OrderLine> {
    self
      .lines
      .values()
      .filter(|line| line.order_id == order_id && !line.is_deleted())
      .cloned()
      .collect()
  }

  fn with_lines(&self, order: &Order) -> Order {
    let mut order = order.clone();
    order.order_lines = self.live_lines_of(order.id);
    order
  }
}

/// In-memory implementation of both persistence ports over one shared state,
/// so that order lookups can preload lines the way a relational adapter would.
///
/// Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
  state: Arc<RwLock<State>>,
  armed_failures: Arc<Mutex<HashSet<&'static str>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes the next call of `operation` (e.g. `"bulk_upsert"`) fail.
  pub fn fail_next(&self, operation: &'static str) {
    self.armed_failures.lock().insert(operation);
  }

  fn check_armed(&self, operation: &'static str) -> StoreResult<()> {
    if self.armed_failures.lock().remove(operation) {
      bail!("{} failed: injected failure", operation);
    }
    Ok(())
  }

  /// Every stored order, including soft-deleted ones, without lines.
  pub fn all_orders(&self) -> Vec<Order> {
    self.state.read().orders.values().cloned().collect()
  }

  /// Every stored line, including soft-deleted ones.
  pub fn all_lines(&self) -> Vec<OrderLine> {
    self.state.read().lines.values().cloned().collect()
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn create(&self, order: &mut Order) -> StoreResult<()> {
    self.check_armed("create")?;
    let mut state = self.state.write();
    state.next_order_id += 1;
    order.id = state.next_order_id;
    let mut row = order.clone();
    row.order_lines.clear();
    state.orders.insert(row.id, row);
    trace!(order_id = order.id, "order inserted");
    Ok(())
  }

  async fn update(&self, order: &Order) -> StoreResult<()> {
    self.check_armed("update")?;
    let mut state = self.state.write();
    let row = state
      .orders
      .get_mut(&order.id)
      .ok_or_else(|| anyhow!("order {} does not exist", order.id))?;
    *row = order.clone();
    row.order_lines.clear();
    Ok(())
  }

  async fn find_by_id(&self, id: OrderId) -> StoreResult<Option<Order>> {
    self.check_armed("find_by_id")?;
    let state = self.state.read();
    Ok(
      state
        .orders
        .get(&id)
        .filter(|order| !order.is_deleted())
        .map(|order| state.with_lines(order)),
    )
  }

  async fn find_page(&self, filter: &OrderFilter) -> StoreResult<Page<Order>> {
    self.check_armed("find_page")?;
    let state = self.state.read();
    let mut owned: Vec<&Order> = state
      .orders
      .values()
      .filter(|order| order.created_by_user_id == filter.owner_id && !order.is_deleted())
      .collect();
    owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let info = PageInformation::new(&filter.page_form, owned.len() as u64);
    let entities = owned
      .into_iter()
      .skip(filter.page_form.offset())
      .take(filter.page_form.size as usize)
      .map(|order| state.with_lines(order))
      .collect();
    Ok(Page::new(info, entities))
  }
}

#[async_trait]
impl OrderLineStore for MemoryStore {
  async fn bulk_upsert(&self, unique_key: &str, batch_size: usize, lines: &mut [OrderLine]) -> StoreResult<()> {
    self.check_armed("bulk_upsert")?;
    if unique_key != "id" {
      bail!("unsupported upsert key '{}'", unique_key);
    }
    let mut state = self.state.write();
    for chunk in lines.chunks_mut(batch_size.max(1)) {
      for line in chunk {
        if line.id == 0 {
          state.next_line_id += 1;
          line.id = state.next_line_id;
        }
        let mut row = line.clone();
        row.product = None;
        state.lines.insert(row.id, row);
      }
    }
    Ok(())
  }

  async fn find_all_by_order_id(&self, order_id: OrderId) -> StoreResult<Vec<OrderLine>> {
    self.check_armed("find_all_by_order_id")?;
    Ok(self.state.read().live_lines_of(order_id))
  }
}
