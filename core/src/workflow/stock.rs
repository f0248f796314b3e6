// orderflow/src/workflow/stock.rs

//! Request-scoped view of the fetched products and the stock arithmetic
//! applied to them.
//!
//! A line's stock effect follows one rule in both directions. Debit (create):
//! the master's `available_stock` drops by `q` when the product has a master,
//! the product's own `available_stock` drops by `q`, and its own `total_sell`
//! grows by `q`. Credit (cancel) is the exact inverse.

use crate::error::{OrderError, OrderResult};
use crate::model::{Product, ProductId};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockMovement {
  Debit,
  Credit,
}

/// Fetched products indexed by id, with masters resolved against the same set.
#[derive(Debug, Default)]
pub struct StockLedger {
  products: Vec<Product>,
  index: HashMap<ProductId, usize>,
}

impl StockLedger {
  pub fn new(products: Vec<Product>) -> Self {
    let mut ledger = Self::default();
    ledger.extend(products);
    ledger
  }

  /// Adds products not already present. Ids already known keep their first record.
  pub fn extend(&mut self, products: Vec<Product>) {
    for product in products {
      if self.index.contains_key(&product.id) {
        continue;
      }
      self.index.insert(product.id, self.products.len());
      self.products.push(product);
    }
  }

  pub fn get(&self, id: ProductId) -> Option<&Product> {
    self.index.get(&id).map(|&idx| &self.products[idx])
  }

  pub fn products(&self) -> &[Product] {
    &self.products
  }

  /// Masters referenced by fetched variants but absent from the ledger.
  pub fn missing_masters(&self) -> Vec<ProductId> {
    let mut missing = Vec::new();
    for master_id in self.products.iter().filter_map(Product::master_id) {
      if !self.index.contains_key(&master_id) && !missing.contains(&master_id) {
        missing.push(master_id);
      }
    }
    missing
  }

  /// Checks that debiting every `(product_id, quantity)` pair would leave no
  /// stock counter negative.
  ///
  /// Demand is summed per counter: a product's own stock carries every line
  /// naming it, and a master's stock additionally carries every line naming
  /// one of its variants. Nothing is mutated.
  ///
  /// A sum that overflows `i64` exceeds any stock and is reported as
  /// `OutOfStock` with `requested` saturated at `i64::MAX`.
  pub fn check_availability(&self, demand: &[(ProductId, i64)]) -> OrderResult<()> {
    let mut totals: Vec<(ProductId, i64)> = Vec::new();

    for &(product_id, quantity) in demand {
      let product = self
        .get(product_id)
        .ok_or(OrderError::ProductNotFound { product_id })?;
      self.add_demand(&mut totals, product_id, quantity)?;
      if let Some(master_id) = product.master_id() {
        if self.get(master_id).is_none() {
          return Err(OrderError::ProductNotFound { product_id: master_id });
        }
        self.add_demand(&mut totals, master_id, quantity)?;
      }
    }

    for (product_id, requested) in totals {
      // Every id in `totals` was resolved above.
      let available = self.get(product_id).map_or(0, |p| p.available_stock);
      if available < requested {
        return Err(OrderError::OutOfStock {
          product_id,
          requested,
          available,
        });
      }
    }
    Ok(())
  }

  fn add_demand(&self, totals: &mut Vec<(ProductId, i64)>, id: ProductId, quantity: i64) -> OrderResult<()> {
    match totals.iter_mut().find(|(known, _)| *known == id) {
      Some((_, sum)) => {
        *sum = sum.checked_add(quantity).ok_or_else(|| OrderError::OutOfStock {
          product_id: id,
          requested: i64::MAX,
          available: self.get(id).map_or(0, |p| p.available_stock),
        })?;
      }
      None => totals.push((id, quantity)),
    }
    Ok(())
  }

  /// Applies one line's stock effect. Returns the product's unit price, or
  /// `None` when the product is not in the ledger (nothing is changed then).
  /// Counters saturate instead of wrapping.
  pub fn apply(&mut self, product_id: ProductId, quantity: i64, movement: StockMovement) -> Option<f64> {
    let idx = *self.index.get(&product_id)?;
    let signed = match movement {
      StockMovement::Debit => quantity,
      StockMovement::Credit => -quantity,
    };

    if let Some(master_id) = self.products[idx].master_id() {
      match self.index.get(&master_id) {
        Some(&master_idx) => {
          let master = &mut self.products[master_idx];
          master.available_stock = master.available_stock.saturating_sub(signed);
        }
        None => warn!(product_id, master_id, "master product missing from catalog response, master stock untouched"),
      }
    }

    let product = &mut self.products[idx];
    product.available_stock = product.available_stock.saturating_sub(signed);
    product.total_sell = product.total_sell.saturating_add(signed);
    Some(product.price)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product(id: ProductId, master: Option<ProductId>, stock: i64, sold: i64) -> Product {
    Product {
      id,
      master_product_id: master,
      price: 10.0,
      available_stock: stock,
      total_sell: sold,
      ..Default::default()
    }
  }

  #[test]
  fn debit_then_credit_restores_counters() {
    let mut ledger = StockLedger::new(vec![product(1, None, 50, 5), product(2, Some(1), 8, 0)]);

    assert_eq!(ledger.apply(2, 3, StockMovement::Debit), Some(10.0));
    assert_eq!(ledger.get(1).unwrap().available_stock, 47);
    assert_eq!(ledger.get(1).unwrap().total_sell, 5);
    assert_eq!(ledger.get(2).unwrap().available_stock, 5);
    assert_eq!(ledger.get(2).unwrap().total_sell, 3);

    ledger.apply(2, 3, StockMovement::Credit);
    assert_eq!(ledger.get(1).unwrap().available_stock, 50);
    assert_eq!(ledger.get(1).unwrap().total_sell, 5);
    assert_eq!(ledger.get(2).unwrap().available_stock, 8);
    assert_eq!(ledger.get(2).unwrap().total_sell, 0);
  }

  #[test]
  fn availability_sums_duplicate_lines() {
    let ledger = StockLedger::new(vec![product(1, None, 5, 0)]);
    assert!(ledger.check_availability(&[(1, 3)]).is_ok());
    match ledger.check_availability(&[(1, 3), (1, 3)]) {
      Err(OrderError::OutOfStock {
        product_id,
        requested,
        available,
      }) => {
        assert_eq!((product_id, requested, available), (1, 6, 5));
      }
      other => panic!("expected OutOfStock, got {:?}", other),
    }
  }

  #[test]
  fn availability_counts_variants_against_master_pool() {
    let ledger = StockLedger::new(vec![
      product(1, None, 4, 0),
      product(2, Some(1), 10, 0),
      product(3, Some(1), 10, 0),
    ]);
    assert!(matches!(
      ledger.check_availability(&[(2, 3), (3, 2)]),
      Err(OrderError::OutOfStock { product_id: 1, requested: 5, available: 4 })
    ));
  }

  #[test]
  fn overflowing_demand_is_out_of_stock() {
    let ledger = StockLedger::new(vec![product(1, None, i64::MAX, 0), product(2, Some(1), i64::MAX, 0)]);
    assert!(ledger.check_availability(&[(1, i64::MAX)]).is_ok());
    assert!(matches!(
      ledger.check_availability(&[(1, i64::MAX), (1, 1)]),
      Err(OrderError::OutOfStock { product_id: 1, requested: i64::MAX, .. })
    ));
    // The master pool overflows even though each variant line fits on its own.
    assert!(matches!(
      ledger.check_availability(&[(1, i64::MAX), (2, 1)]),
      Err(OrderError::OutOfStock { product_id: 1, requested: i64::MAX, .. })
    ));
  }

  #[test]
  fn unknown_products_and_masters_are_reported() {
    let ledger = StockLedger::new(vec![product(2, Some(9), 10, 0)]);
    assert_eq!(ledger.missing_masters(), vec![9]);
    assert!(matches!(
      ledger.check_availability(&[(7, 1)]),
      Err(OrderError::ProductNotFound { product_id: 7 })
    ));
    assert!(matches!(
      ledger.check_availability(&[(2, 1)]),
      Err(OrderError::ProductNotFound { product_id: 9 })
    ));
  }
}
