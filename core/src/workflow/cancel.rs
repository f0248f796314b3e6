// orderflow/src/workflow/cancel.rs

//! Order cancellation: soft-delete the order and its lines and give back
//! exactly the stock its creation took.

use super::common_steps::{self, distinct_ids, persistence_failure};
use super::contexts::CancelOrderCtxData;
use super::stock::{StockLedger, StockMovement};
use crate::core::{ContextData, PipelineControl, SkipCondition};
use crate::error::{OrderError, OrderResult, PipelineError};
use crate::model::OrderStatus;
use crate::pipeline::Pipeline;
use std::sync::Arc;
use tracing::{info, warn};

const OPERATION: &str = "cancel_order";

pub(crate) fn build_cancel_pipeline() -> Pipeline<CancelOrderCtxData, OrderError> {
  let masters_resolved: SkipCondition<CancelOrderCtxData> =
    Arc::new(|ctx: ContextData<CancelOrderCtxData>| ctx.read().ledger.missing_masters().is_empty());

  let mut p = Pipeline::new(
    OPERATION,
    &[
      ("load_order", false, None),
      ("authorize_owner", false, None),
      ("load_lines", false, None),
      ("fetch_products", false, None),
      ("resolve_master_products", false, Some(masters_resolved)),
      ("restore_stock", false, None),
      ("mark_cancelled", false, None),
      ("persist_order", false, None),
      ("persist_order_lines", false, None),
      ("push_stock", false, None),
    ],
  );

  p.on_root("load_order", load_order);
  p.on_root("authorize_owner", authorize_owner);
  p.on_root("load_lines", load_lines);
  p.on_root("fetch_products", fetch_products);
  p.on_root("resolve_master_products", resolve_master_products);
  p.on_root("restore_stock", restore_stock);
  p.on_root("mark_cancelled", mark_cancelled);
  p.on_root("persist_order", persist_order);
  p.on_root("persist_order_lines", persist_order_lines);
  p.on_root("push_stock", push_stock);
  p
}

fn missing_order() -> OrderError {
  PipelineError::MissingOutput {
    pipeline: OPERATION,
    missing: "loaded order",
  }
  .into()
}

async fn load_order(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, order_id) = {
    let guard = ctx.read();
    (guard.deps.clone(), guard.order_id)
  };
  let order = common_steps::load_order(&deps, OPERATION, order_id).await?;
  ctx.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

async fn authorize_owner(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let guard = ctx.read();
  let order = guard.order.as_ref().ok_or_else(missing_order)?;
  common_steps::authorize_owner(order, guard.caller.user_id)?;
  Ok(PipelineControl::Continue)
}

async fn load_lines(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, order_id) = {
    let guard = ctx.read();
    (guard.deps.clone(), guard.order_id)
  };
  let lines = deps
    .order_lines
    .find_all_by_order_id(order_id)
    .await
    .map_err(|e| persistence_failure(OPERATION, &format!("order {}", order_id), e))?;
  ctx.write().lines = lines;
  Ok(PipelineControl::Continue)
}

async fn fetch_products(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, ids, language) = {
    let guard = ctx.read();
    (
      guard.deps.clone(),
      distinct_ids(guard.lines.iter().map(|line| line.product_id)),
      guard.caller.language.clone(),
    )
  };
  let products = common_steps::lookup_products(&deps, OPERATION, &ids, &language).await?;
  ctx.write().ledger = StockLedger::new(products);
  Ok(PipelineControl::Continue)
}

async fn resolve_master_products(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, mut ledger, language) = {
    let mut guard = ctx.write();
    (guard.deps.clone(), std::mem::take(&mut guard.ledger), guard.caller.language.clone())
  };
  common_steps::resolve_master_products(&deps, OPERATION, &mut ledger, &language).await?;
  ctx.write().ledger = ledger;
  Ok(PipelineControl::Continue)
}

/// Inverse of the creation debit. Lines whose product the catalog no longer
/// knows are still cancelled; only their stock credit is skipped.
async fn restore_stock(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let mut guard = ctx.write();
  let data = &mut *guard;
  for line in &data.lines {
    if data
      .ledger
      .apply(line.product_id, line.quantity, StockMovement::Credit)
      .is_none()
    {
      warn!(
        order_id = data.order_id,
        product_id = line.product_id,
        "Product missing from catalog, stock not restored for this line."
      );
    }
  }
  Ok(PipelineControl::Continue)
}

async fn mark_cancelled(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let mut guard = ctx.write();
  let data = &mut *guard;
  let (now, user_id) = (data.now, data.caller.user_id);
  for line in data.lines.iter_mut() {
    line.mark_deleted(now, user_id);
  }
  let order = data.order.as_mut().ok_or_else(missing_order)?;
  order.status = OrderStatus::Cancelled;
  order.mark_deleted(now, user_id);
  Ok(PipelineControl::Continue)
}

async fn persist_order(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, order) = {
    let guard = ctx.read();
    (guard.deps.clone(), guard.order.clone())
  };
  let order = order.ok_or_else(missing_order)?;
  deps
    .orders
    .update(&order)
    .await
    .map_err(|e| persistence_failure(OPERATION, &format!("order {}", order.id), e))?;
  Ok(PipelineControl::Continue)
}

async fn persist_order_lines(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, order_id, mut lines) = {
    let mut guard = ctx.write();
    (guard.deps.clone(), guard.order_id, std::mem::take(&mut guard.lines))
  };
  deps
    .order_lines
    .bulk_upsert("id", deps.bulk_batch_size, &mut lines)
    .await
    .map_err(|e| persistence_failure(OPERATION, &format!("order {}", order_id), e))?;
  ctx.write().lines = lines;
  Ok(PipelineControl::Continue)
}

async fn push_stock(ctx: ContextData<CancelOrderCtxData>) -> OrderResult<PipelineControl> {
  let (deps, order_id, products, language) = {
    let guard = ctx.read();
    (
      guard.deps.clone(),
      guard.order_id,
      guard.ledger.products().to_vec(),
      guard.caller.language.clone(),
    )
  };
  if let Err(e) = common_steps::push_stock(&deps, OPERATION, order_id, &products, &language).await {
    warn!(order_id, "Order cancelled but catalog stock was not restored.");
    return Err(e);
  }
  info!(order_id, products = products.len(), "Stock restored.");
  Ok(PipelineControl::Continue)
}
