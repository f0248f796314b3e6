// orderflow/src/workflow/create.rs

//! Order creation: validate stock against the catalog, persist the order and
//! its lines, then push the debited stock back to the catalog.
//!
//! There is no compensation: a failure after `persist_order` leaves the rows
//! already written in place.

use super::common_steps::{self, persistence_failure};
use super::contexts::CreateOrderCtxData;
use super::stock::{StockLedger, StockMovement};
use crate::core::{ContextData, PipelineControl, SkipCondition};
use crate::error::{OrderError, OrderResult, PipelineError};
use crate::model::{Order, OrderLine, OrderStatus};
use crate::pipeline::Pipeline;
use std::sync::Arc;
use tracing::{info, warn};

const OPERATION: &str = "create_order";

pub(crate) fn build_create_pipeline() -> Pipeline<CreateOrderCtxData, OrderError> {
  let masters_resolved: SkipCondition<CreateOrderCtxData> =
    Arc::new(|ctx: ContextData<CreateOrderCtxData>| ctx.read().ledger.missing_masters().is_empty());

  let mut p = Pipeline::new(
    OPERATION,
    &[
      ("validate_request", false, None),
      ("fetch_products", false, None),
      ("resolve_master_products", false, Some(masters_resolved)),
      ("check_stock", false, None),
      ("persist_order", false, None),
      ("apply_stock_movements", false, None),
      ("persist_order_lines", false, None),
      ("push_stock", false, None),
    ],
  );

  p.on_root("validate_request", validate_request);
  p.on_root("fetch_products", fetch_products);
  p.on_root("resolve_master_products", resolve_master_products);
  p.on_root("check_stock", check_stock);
  p.on_root("persist_order", persist_order);
  p.on_root("apply_stock_movements", apply_stock_movements);
  p.on_root("persist_order_lines", persist_order_lines);
  p.on_root("push_stock", push_stock);
  p
}

async fn validate_request(ctx: ContextData<CreateOrderCtxData>) -> OrderResult<PipelineControl> {
  let guard = ctx.read();
  if guard.request.order_lines.is_empty() {
    return Err(OrderError::InvalidRequest("an order needs at least one line".to_string()));
  }
  if let Some(line) = guard.request.order_lines.iter().find(|line| line.quantity <= 0) {
    return Err(OrderError::InvalidRequest(format!(
      "quantity for product {} must be positive, got {}",
      line.product_id, line.quantity
    )));
  }
  Ok(PipelineControl::Continue)
}

async fn fetch_products(ctx: ContextData<CreateOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, ids, language) = {
    let guard = ctx.read();
    (guard.deps.clone(), guard.request.product_ids(), guard.caller.language.clone())
  };
  let products = common_steps::lookup_products(&deps, OPERATION, &ids, &language).await?;
  ctx.write().ledger = StockLedger::new(products);
  Ok(PipelineControl::Continue)
}

async fn resolve_master_products(ctx: ContextData<CreateOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, mut ledger, language) = {
    let mut guard = ctx.write();
    (guard.deps.clone(), std::mem::take(&mut guard.ledger), guard.caller.language.clone())
  };
  common_steps::resolve_master_products(&deps, OPERATION, &mut ledger, &language).await?;
  ctx.write().ledger = ledger;
  Ok(PipelineControl::Continue)
}

/// Runs before anything is written: an out-of-stock request leaves the store
/// and the catalog untouched.
async fn check_stock(ctx: ContextData<CreateOrderCtxData>) -> OrderResult<PipelineControl> {
  let guard = ctx.read();
  let demand: Vec<_> = guard
    .request
    .order_lines
    .iter()
    .map(|line| (line.product_id, line.quantity))
    .collect();
  if let Err(e) = guard.ledger.check_availability(&demand) {
    warn!(user_id = guard.caller.user_id, error = %e, "Order rejected.");
    return Err(e);
  }
  Ok(PipelineControl::Continue)
}

async fn persist_order(ctx: ContextData<CreateOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, mut order) = {
    let guard = ctx.read();
    let request = &guard.request;
    let order = Order {
      order_number: Order::generate_order_number(guard.now),
      address_id: request.address_id.clone(),
      net_price: request.net_price,
      discount: request.discount,
      shipping_price: request.shipping_price,
      tracking_code: request.tracking_code.clone(),
      voucher_id: request.voucher_id,
      status: OrderStatus::Draft,
      created_by_user_id: guard.caller.user_id,
      created_at: guard.now,
      updated_at: guard.now,
      ..Default::default()
    };
    (guard.deps.clone(), order)
  };

  let subject = format!("order {}", order.order_number);
  deps
    .orders
    .create(&mut order)
    .await
    .map_err(|e| persistence_failure(OPERATION, &subject, e))?;
  info!(order_id = order.id, order_number = %order.order_number, "Order row created.");
  ctx.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

/// Debits stock line by line, accumulates totals and snapshots prices.
async fn apply_stock_movements(ctx: ContextData<CreateOrderCtxData>) -> OrderResult<PipelineControl> {
  let mut guard = ctx.write();
  let data = &mut *guard;
  let order = data
    .order
    .as_mut()
    .ok_or(PipelineError::MissingOutput {
      pipeline: OPERATION,
      missing: "persisted order",
    })?;

  let mut lines = Vec::with_capacity(data.request.order_lines.len());
  for requested in &data.request.order_lines {
    // check_stock already proved every product is present.
    let Some(price) = data
      .ledger
      .apply(requested.product_id, requested.quantity, StockMovement::Debit)
    else {
      return Err(OrderError::ProductNotFound {
        product_id: requested.product_id,
      });
    };
    let line = OrderLine {
      order_id: order.id,
      product_id: requested.product_id,
      quantity: requested.quantity,
      price,
      created_by_user_id: data.caller.user_id,
      created_at: data.now,
      ..Default::default()
    };
    order.accumulate(&line);
    lines.push(line);
  }
  data.lines = lines;
  Ok(PipelineControl::Continue)
}

async fn persist_order_lines(ctx: ContextData<CreateOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, order, mut lines) = {
    let mut guard = ctx.write();
    let order = guard.order.clone();
    (guard.deps.clone(), order, std::mem::take(&mut guard.lines))
  };
  let Some(order) = order else {
    return Err(
      PipelineError::MissingOutput {
        pipeline: OPERATION,
        missing: "persisted order",
      }
      .into(),
    );
  };
  let subject = format!("order {}", order.id);

  deps
    .orders
    .update(&order)
    .await
    .map_err(|e| persistence_failure(OPERATION, &subject, e))?;
  deps
    .order_lines
    .bulk_upsert("id", deps.bulk_batch_size, &mut lines)
    .await
    .map_err(|e| persistence_failure(OPERATION, &subject, e))?;

  let mut guard = ctx.write();
  if let Some(order) = guard.order.as_mut() {
    order.order_lines = lines;
  }
  Ok(PipelineControl::Continue)
}

async fn push_stock(ctx: ContextData<CreateOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, order_id, products, language) = {
    let guard = ctx.read();
    (
      guard.deps.clone(),
      guard.order.as_ref().map_or(0, |o| o.id),
      guard.ledger.products().to_vec(),
      guard.caller.language.clone(),
    )
  };
  if let Err(e) = common_steps::push_stock(&deps, OPERATION, order_id, &products, &language).await {
    // The order and its lines are already committed; the catalog was not debited.
    warn!(order_id, "Order persisted but catalog stock was not updated.");
    return Err(e);
  }
  Ok(PipelineControl::Continue)
}
