// orderflow/src/enrichment.rs

//! Attaches fetched catalog products to order lines on a bounded rayon pool.
//!
//! Every work item (a single line, or one order's line slice) is spawned
//! into one pool scope. The call returns only when the scope has joined, so
//! callers always observe fully enriched data. Each task writes only its own
//! item; the product slice is shared read-only.

use crate::model::{Order, OrderLine, Product};
use rayon::{Scope, ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Twice the available parallelism, or 2 when it cannot be determined.
pub fn default_worker_count() -> usize {
  thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1) * 2
}

#[derive(Debug, Clone)]
pub struct EnrichmentPool {
  workers: usize,
  /// `None` when the dedicated pool could not be started; work then runs on
  /// rayon's global pool.
  pool: Option<Arc<ThreadPool>>,
}

impl Default for EnrichmentPool {
  fn default() -> Self {
    Self::new(default_worker_count())
  }
}

impl EnrichmentPool {
  pub fn new(workers: usize) -> Self {
    let workers = workers.max(1);
    let pool = match ThreadPoolBuilder::new()
      .num_threads(workers)
      .thread_name(|idx| format!("order-enrich-{}", idx))
      .build()
    {
      Ok(pool) => Some(Arc::new(pool)),
      Err(e) => {
        warn!(workers, error = %e, "Enrichment pool not started, falling back to the global rayon pool.");
        None
      }
    };
    Self { workers, pool }
  }

  pub fn workers(&self) -> usize {
    self.workers
  }

  /// Enriches the lines of a single order, one line per task.
  /// Returns how many lines found their product.
  pub fn enrich_lines(&self, lines: &mut [OrderLine], products: &[Product]) -> usize {
    let total = lines.len();
    let matched = self.run(lines.iter_mut(), products, |line, products| {
      usize::from(attach_product(line, products))
    });
    debug!(lines = total, matched, "enriched order lines");
    matched
  }

  /// Enriches every order of a page, one order's line slice per task.
  /// Returns how many lines found their product.
  pub fn enrich_orders(&self, orders: &mut [Order], products: &[Product]) -> usize {
    let total = orders.len();
    let batches = orders.iter_mut().map(|order| order.order_lines.as_mut_slice());
    let matched = self.run(batches, products, |lines, products| {
      lines
        .iter_mut()
        .map(|line| usize::from(attach_product(line, products)))
        .sum()
    });
    debug!(orders = total, matched, "enriched orders");
    matched
  }

  fn run<T, I, F>(&self, items: I, products: &[Product], work: F) -> usize
  where
    I: ExactSizeIterator<Item = T> + Send,
    T: Send,
    F: Fn(T, &[Product]) -> usize + Sync,
  {
    if items.len() == 0 {
      return 0;
    }

    let matched = AtomicUsize::new(0);
    match &self.pool {
      Some(pool) => pool.scope(|scope| spawn_all(scope, items, products, &work, &matched)),
      None => rayon::scope(|scope| spawn_all(scope, items, products, &work, &matched)),
    }
    matched.into_inner()
  }
}

fn spawn_all<'scope, T, I, F>(
  scope: &Scope<'scope>,
  items: I,
  products: &'scope [Product],
  work: &'scope F,
  matched: &'scope AtomicUsize,
) where
  I: Iterator<Item = T>,
  T: Send + 'scope,
  F: Fn(T, &[Product]) -> usize + Sync,
{
  for item in items {
    scope.spawn(move |_| {
      matched.fetch_add(work(item, products), Ordering::Relaxed);
    });
  }
}

/// Linear scan; product ids are unique within one catalog response.
fn attach_product(line: &mut OrderLine, products: &[Product]) -> bool {
  match products.iter().find(|product| product.id == line.product_id) {
    Some(product) => {
      line.product = Some(product.clone());
      true
    }
    None => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product(id: u64) -> Product {
    Product {
      id,
      name: format!("product-{}", id),
      price: id as f64,
      ..Default::default()
    }
  }

  fn line(product_id: u64) -> OrderLine {
    OrderLine {
      product_id,
      quantity: 1,
      ..Default::default()
    }
  }

  #[test]
  fn every_matching_line_is_enriched_before_return() {
    let products: Vec<Product> = (1..=10).map(product).collect();
    let mut lines: Vec<OrderLine> = (0..500).map(|i| line(i % 12 + 1)).collect();

    let matched = EnrichmentPool::new(4).enrich_lines(&mut lines, &products);

    assert_eq!(matched, lines.iter().filter(|l| l.product_id <= 10).count());
    for l in &lines {
      match &l.product {
        Some(p) => assert_eq!(p.id, l.product_id),
        None => assert!(l.product_id > 10),
      }
    }
  }

  #[test]
  fn orders_are_enriched_batch_by_batch() {
    let products = vec![product(1), product(2)];
    let mut orders: Vec<Order> = (0..7)
      .map(|i| Order {
        id: i,
        order_lines: vec![line(1), line(2), line(3)],
        ..Default::default()
      })
      .collect();

    let matched = EnrichmentPool::new(16).enrich_orders(&mut orders, &products);

    assert_eq!(matched, 14);
    for order in &orders {
      assert_eq!(order.order_lines[0].product.as_ref().map(|p| p.id), Some(1));
      assert_eq!(order.order_lines[1].product.as_ref().map(|p| p.id), Some(2));
      assert!(order.order_lines[2].product.is_none());
    }
  }

  #[test]
  fn empty_input_spawns_nothing() {
    let mut lines: Vec<OrderLine> = Vec::new();
    assert_eq!(EnrichmentPool::default().enrich_lines(&mut lines, &[product(1)]), 0);
  }

  #[test]
  fn work_runs_on_the_dedicated_pool() {
    let pool = EnrichmentPool::new(3);
    let on_pool = pool.run((0..20).map(|_| ()), &[], |_, _| {
      usize::from(
        thread::current()
          .name()
          .is_some_and(|name| name.starts_with("order-enrich-")),
      )
    });
    assert_eq!(on_pool, 20);
  }

  #[test]
  fn worker_count_is_never_zero() {
    assert_eq!(EnrichmentPool::new(0).workers(), 1);
    assert!(default_worker_count() >= 2);
  }
}
