// orderflow/examples/order_roundtrip.rs

use orderflow::{
  CreateOrderRequest, InMemoryCatalog, MemoryStore, OrderError, OrderLineRequest, OrderWorkflow, PageForm, Product,
  WorkflowConfig, WorkflowContext,
};
use std::sync::Arc;
use tracing::info;

fn product(id: u64, master: Option<u64>, price: f64, stock: i64) -> Product {
  Product {
    id,
    master_product_id: master,
    name: format!("product-{}", id),
    price,
    available_stock: stock,
    total_sell: 0,
  }
}

#[tokio::main]
async fn main() -> Result<(), OrderError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Order Round Trip Example ---");

  // 1. A catalog with one master pool shared by two variants.
  let catalog = Arc::new(InMemoryCatalog::new(vec![
    product(1, None, 0.0, 10),
    product(2, Some(1), 120.0, 40),
    product(3, Some(1), 150.0, 40),
    product(4, None, 35.0, 200),
  ]));
  let store = MemoryStore::new();

  // 2. Both persistence ports are served by the same in-memory store.
  let workflow = OrderWorkflow::new(
    Arc::new(store.clone()),
    Arc::new(store.clone()),
    catalog.clone(),
    WorkflowConfig::default(),
  );
  let alice = WorkflowContext::new(1001, "en");

  // 3. Create an order.
  let request = CreateOrderRequest {
    address_id: "home".to_string(),
    shipping_price: 40.0,
    order_lines: vec![
      OrderLineRequest { product_id: 2, quantity: 3 },
      OrderLineRequest { product_id: 3, quantity: 2 },
      OrderLineRequest { product_id: 4, quantity: 10 },
    ],
    ..Default::default()
  };
  let order = workflow.create(&alice, request).await?;
  info!(
    "Created {} with {} items, total {:.2}",
    order.order_number, order.total_quantity, order.total_price
  );
  for id in 1..=4 {
    if let Some(p) = catalog.get(id) {
      info!("  product {}: stock {}, sold {}", p.id, p.available_stock, p.total_sell);
    }
  }

  // 4. The master pool has 5 units left; asking for 6 more is rejected.
  let greedy = CreateOrderRequest {
    address_id: "home".to_string(),
    order_lines: vec![OrderLineRequest { product_id: 2, quantity: 6 }],
    ..Default::default()
  };
  match workflow.create(&alice, greedy).await {
    Err(e @ OrderError::OutOfStock { .. }) => info!("Rejected as expected: {}", e),
    other => info!("Unexpected outcome: {:?}", other.map(|o| o.id)),
  }

  // 5. Read it back, enriched with live catalog data.
  let page = workflow.find_all(&alice, PageForm::default()).await?;
  for listed in &page.entities {
    info!("Order {} ({} lines)", listed.order_number, listed.order_lines.len());
    for line in &listed.order_lines {
      let name = line.product.as_ref().map_or("<unknown>", |p| p.name.as_str());
      info!("  {} x {} @ {:.2}", line.quantity, name, line.price);
    }
  }

  // 6. Cancel gives every unit back.
  workflow.cancel(&alice, order.id).await?;
  let master = catalog.get(1).map(|p| p.available_stock);
  info!("Cancelled {}; master stock back to {:?}", order.order_number, master);
  assert_eq!(master, Some(10));

  Ok(())
}
