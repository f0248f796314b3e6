// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use orderflow::{
  CreateOrderRequest, InMemoryCatalog, MemoryStore, OrderLineRequest, OrderWorkflow, Product, WorkflowConfig,
  WorkflowContext,
};
use std::sync::Arc;
use tracing::Level;

pub const OWNER: u64 = 7;
pub const STRANGER: u64 = 8;

/// Standalone product with stock 100 and price 25.0.
pub const PLAIN: u64 = 1;
/// Master pool shared by the two variants below, stock 10.
pub const MASTER: u64 = 10;
/// Variant of `MASTER`, own stock 50, price 40.0.
pub const VARIANT_A: u64 = 11;
/// Variant of `MASTER`, own stock 50, price 60.0.
pub const VARIANT_B: u64 = 12;
/// Variant whose master the catalog does not know.
pub const ORPHAN: u64 = 20;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn product(id: u64, master: Option<u64>, price: f64, stock: i64) -> Product {
  Product {
    id,
    master_product_id: master,
    name: format!("product-{}", id),
    price,
    available_stock: stock,
    total_sell: 0,
  }
}

pub fn seeded_catalog() -> InMemoryCatalog {
  InMemoryCatalog::new(vec![
    product(PLAIN, None, 25.0, 100),
    product(MASTER, None, 0.0, 10),
    product(VARIANT_A, Some(MASTER), 40.0, 50),
    product(VARIANT_B, Some(MASTER), 60.0, 50),
    product(ORPHAN, Some(99), 5.0, 5),
  ])
}

pub struct Harness {
  pub catalog: Arc<InMemoryCatalog>,
  pub store: MemoryStore,
  pub workflow: OrderWorkflow,
}

pub fn harness() -> Harness {
  harness_with(seeded_catalog(), WorkflowConfig::default())
}

pub fn harness_with(catalog: InMemoryCatalog, config: WorkflowConfig) -> Harness {
  setup_tracing();
  let catalog = Arc::new(catalog);
  let store = MemoryStore::new();
  let workflow = OrderWorkflow::new(Arc::new(store.clone()), Arc::new(store.clone()), catalog.clone(), config);
  Harness {
    catalog,
    store,
    workflow,
  }
}

pub fn caller(user_id: u64) -> WorkflowContext {
  WorkflowContext::new(user_id, "en")
}

pub fn request(lines: &[(u64, i64)]) -> CreateOrderRequest {
  CreateOrderRequest {
    address_id: "addr-1".to_string(),
    net_price: 0.0,
    discount: 0.0,
    shipping_price: 30.0,
    tracking_code: None,
    voucher_id: None,
    order_lines: lines
      .iter()
      .map(|&(product_id, quantity)| OrderLineRequest { product_id, quantity })
      .collect(),
  }
}

/// `(available_stock, total_sell)` of a product as the catalog holds it now.
pub fn counters(catalog: &InMemoryCatalog, id: u64) -> (i64, i64) {
  let product = catalog.get(id).expect("product seeded");
  (product.available_stock, product.total_sell)
}
