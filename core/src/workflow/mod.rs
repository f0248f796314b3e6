// orderflow/src/workflow/mod.rs

//! The order lifecycle: create, cancel, find one, find all.
//!
//! Each operation is a named [`Pipeline`] over its own context type, built
//! once when the workflow is constructed. [`OrderWorkflow`] owns the four
//! pipelines and the collaborators they share.

mod cancel;
mod common_steps;
pub mod contexts;
mod create;
mod find;
pub mod stock;

pub use contexts::WorkflowDeps;
pub use stock::{StockLedger, StockMovement};

use crate::catalog::CatalogClient;
use crate::config::WorkflowConfig;
use crate::core::ContextData;
use crate::enrichment::EnrichmentPool;
use crate::error::{OrderError, OrderResult, PipelineError};
use crate::model::{CreateOrderRequest, Order, OrderId, Page, PageForm, WorkflowContext};
use crate::pipeline::Pipeline;
use crate::store::{OrderLineStore, OrderStore};
use contexts::{CancelOrderCtxData, CreateOrderCtxData, FindAllCtxData, FindOneCtxData};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

pub struct OrderWorkflow {
  deps: WorkflowDeps,
  /// Serializes creations within this process. The check-then-debit window
  /// spans two catalog calls, so it is not safe across several instances.
  create_lock: Mutex<()>,
  create: Pipeline<CreateOrderCtxData, OrderError>,
  cancel: Pipeline<CancelOrderCtxData, OrderError>,
  find_one: Pipeline<FindOneCtxData, OrderError>,
  find_all: Pipeline<FindAllCtxData, OrderError>,
}

impl OrderWorkflow {
  pub fn new(
    orders: Arc<dyn OrderStore>,
    order_lines: Arc<dyn OrderLineStore>,
    catalog: Arc<dyn CatalogClient>,
    config: WorkflowConfig,
  ) -> Self {
    let deps = WorkflowDeps {
      orders,
      order_lines,
      catalog,
      pool: EnrichmentPool::new(config.workers),
      bulk_batch_size: config.bulk_batch_size.max(1),
    };
    Self {
      deps,
      create_lock: Mutex::new(()),
      create: create::build_create_pipeline(),
      cancel: cancel::build_cancel_pipeline(),
      find_one: find::build_find_one_pipeline(),
      find_all: find::build_find_all_pipeline(),
    }
  }

  /// Validates stock, persists the order and its lines, and debits the
  /// catalog. The returned order carries its lines with price snapshots.
  #[instrument(skip(self, caller, request), fields(user_id = caller.user_id, lines = request.order_lines.len()), err(Display))]
  pub async fn create(&self, caller: &WorkflowContext, request: CreateOrderRequest) -> OrderResult<Order> {
    let _guard = self.create_lock.lock().await;
    let ctx = ContextData::new(CreateOrderCtxData::new(self.deps.clone(), caller.clone(), request));
    self.create.run(ctx.clone()).await?;

    let order = finish(ctx, self.create.name(), "created order")?
      .order
      .ok_or(PipelineError::MissingOutput {
        pipeline: self.create.name(),
        missing: "created order",
      })?;
    info!(order_id = order.id, order_number = %order.order_number, total_price = order.total_price, "Order created.");
    Ok(order)
  }

  /// Soft-deletes the caller's order and its lines and credits the stock
  /// back to the catalog.
  #[instrument(skip(self, caller), fields(user_id = caller.user_id), err(Display))]
  pub async fn cancel(&self, caller: &WorkflowContext, order_id: OrderId) -> OrderResult<()> {
    let ctx = ContextData::new(CancelOrderCtxData::new(self.deps.clone(), caller.clone(), order_id));
    self.cancel.run(ctx).await?;
    info!(order_id, "Order cancelled.");
    Ok(())
  }

  /// The caller's live order, lines enriched with current catalog data.
  #[instrument(skip(self, caller), fields(user_id = caller.user_id), err(Display))]
  pub async fn find_one(&self, caller: &WorkflowContext, order_id: OrderId) -> OrderResult<Order> {
    let ctx = ContextData::new(FindOneCtxData::new(self.deps.clone(), caller.clone(), order_id));
    self.find_one.run(ctx.clone()).await?;

    let order = finish(ctx, self.find_one.name(), "order")?
      .order
      .ok_or(PipelineError::MissingOutput {
        pipeline: self.find_one.name(),
        missing: "order",
      })?;
    Ok(order)
  }

  /// One page of the caller's live orders, newest first, lines enriched.
  #[instrument(skip(self, caller), fields(user_id = caller.user_id, page = page_form.page, size = page_form.size), err(Display))]
  pub async fn find_all(&self, caller: &WorkflowContext, page_form: PageForm) -> OrderResult<Page<Order>> {
    let ctx = ContextData::new(FindAllCtxData::new(self.deps.clone(), caller.clone(), page_form));
    self.find_all.run(ctx.clone()).await?;

    let page = finish(ctx, self.find_all.name(), "order page")?
      .page
      .ok_or(PipelineError::MissingOutput {
        pipeline: self.find_all.name(),
        missing: "order page",
      })?;
    Ok(page)
  }
}

/// Takes the context back once the run released every clone.
fn finish<T: Send + Sync + 'static>(ctx: ContextData<T>, pipeline: &'static str, missing: &'static str) -> OrderResult<T> {
  ctx
    .into_inner()
    .ok_or_else(|| PipelineError::MissingOutput { pipeline, missing }.into())
}
