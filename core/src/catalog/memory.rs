// orderflow/src/catalog/memory.rs

use super::{CatalogClient, CatalogError, CatalogResult};
use crate::model::{Message, Product, ProductId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

/// A process-local catalog.
///
/// Keeps call counters so callers can assert which endpoints a workflow hit,
/// and can be armed to fail the next lookup or bulk update.
#[derive(Default)]
pub struct InMemoryCatalog {
  products: Mutex<BTreeMap<ProductId, Product>>,
  lookups: AtomicUsize,
  bulk_updates: AtomicUsize,
  fail_next_lookup: AtomicBool,
  fail_next_bulk_update: AtomicBool,
}

impl InMemoryCatalog {
  pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
    let catalog = Self::default();
    catalog.upsert(products);
    catalog
  }

  pub fn upsert(&self, products: impl IntoIterator<Item = Product>) {
    let mut guard = self.products.lock();
    for product in products {
      guard.insert(product.id, product);
    }
  }

  pub fn remove(&self, id: ProductId) -> Option<Product> {
    self.products.lock().remove(&id)
  }

  pub fn get(&self, id: ProductId) -> Option<Product> {
    self.products.lock().get(&id).cloned()
  }

  pub fn lookup_count(&self) -> usize {
    self.lookups.load(Ordering::SeqCst)
  }

  pub fn bulk_update_count(&self) -> usize {
    self.bulk_updates.load(Ordering::SeqCst)
  }

  pub fn fail_next_lookup(&self) {
    self.fail_next_lookup.store(true, Ordering::SeqCst);
  }

  pub fn fail_next_bulk_update(&self) {
    self.fail_next_bulk_update.store(true, Ordering::SeqCst);
  }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
  async fn lookup(&self, ids: &[ProductId], language: &str) -> CatalogResult<Vec<Product>> {
    self.lookups.fetch_add(1, Ordering::SeqCst);
    if self.fail_next_lookup.swap(false, Ordering::SeqCst) {
      return Err(CatalogError::Unavailable("lookup rejected".to_string()));
    }
    let guard = self.products.lock();
    let found: Vec<Product> = ids.iter().filter_map(|id| guard.get(id).cloned()).collect();
    debug!(requested = ids.len(), found = found.len(), language, "in-memory catalog lookup");
    Ok(found)
  }

  async fn bulk_update(&self, products: &[Product], _language: &str) -> CatalogResult<Message> {
    self.bulk_updates.fetch_add(1, Ordering::SeqCst);
    if self.fail_next_bulk_update.swap(false, Ordering::SeqCst) {
      return Err(CatalogError::Status {
        status: 503,
        body: "bulk update rejected".to_string(),
      });
    }
    self.upsert(products.iter().cloned());
    Ok(Message {
      message: "success".to_string(),
    })
  }
}
