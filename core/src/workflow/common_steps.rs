// orderflow/src/workflow/common_steps.rs

//! Catalog and store calls shared by several pipelines. Each failure is
//! logged with its operation name and subject id, then classified.

use super::contexts::WorkflowDeps;
use super::stock::StockLedger;
use crate::catalog::CatalogError;
use crate::error::{OrderError, OrderResult};
use crate::model::{Order, OrderId, Product, ProductId, UserId};
use tracing::{debug, error, instrument};

pub(crate) fn upstream_failure(operation: &'static str, subject: &str, source: CatalogError) -> OrderError {
  error!(operation, subject, error = %source, "Catalog call failed.");
  OrderError::UpstreamFailure { operation, source }
}

pub(crate) fn persistence_failure(operation: &'static str, subject: &str, source: anyhow::Error) -> OrderError {
  error!(operation, subject, error = %source, "Store call failed.");
  OrderError::PersistenceFailure { operation, source }
}

/// Distinct ids in first-seen order.
pub(crate) fn distinct_ids(ids: impl IntoIterator<Item = ProductId>) -> Vec<ProductId> {
  let mut distinct = Vec::new();
  for id in ids {
    if !distinct.contains(&id) {
      distinct.push(id);
    }
  }
  distinct
}

/// One catalog lookup. An empty id set short-circuits without a call.
#[instrument(skip(deps, ids), fields(count = ids.len()), err(Display))]
pub(crate) async fn lookup_products(
  deps: &WorkflowDeps,
  operation: &'static str,
  ids: &[ProductId],
  language: &str,
) -> OrderResult<Vec<Product>> {
  if ids.is_empty() {
    return Ok(Vec::new());
  }
  let products = deps
    .catalog
    .lookup(ids, language)
    .await
    .map_err(|e| upstream_failure(operation, &format!("products {:?}", ids), e))?;
  debug!(requested = ids.len(), returned = products.len(), "Products fetched.");
  Ok(products)
}

/// Fetches masters referenced by the ledger's variants that the first
/// lookup did not return, and adds them to the ledger.
pub(crate) async fn resolve_master_products(
  deps: &WorkflowDeps,
  operation: &'static str,
  ledger: &mut StockLedger,
  language: &str,
) -> OrderResult<()> {
  let missing = ledger.missing_masters();
  let masters = lookup_products(deps, operation, &missing, language).await?;
  ledger.extend(masters);
  Ok(())
}

/// The single bulk update of a create or cancel call.
#[instrument(skip(deps, products), fields(count = products.len()), err(Display))]
pub(crate) async fn push_stock(
  deps: &WorkflowDeps,
  operation: &'static str,
  order_id: OrderId,
  products: &[Product],
  language: &str,
) -> OrderResult<()> {
  deps
    .catalog
    .bulk_update(products, language)
    .await
    .map_err(|e| upstream_failure(operation, &format!("order {}", order_id), e))?;
  Ok(())
}

/// Loads a live order; absent rows are `NotFound`.
pub(crate) async fn load_order(deps: &WorkflowDeps, operation: &'static str, order_id: OrderId) -> OrderResult<Order> {
  deps
    .orders
    .find_by_id(order_id)
    .await
    .map_err(|e| persistence_failure(operation, &format!("order {}", order_id), e))?
    .ok_or(OrderError::NotFound { order_id })
}

/// Only the creator of an order may read or cancel it.
pub(crate) fn authorize_owner(order: &Order, user_id: UserId) -> OrderResult<()> {
  if order.created_by_user_id != user_id {
    return Err(OrderError::PermissionDenied {
      order_id: order.id,
      user_id,
    });
  }
  Ok(())
}
