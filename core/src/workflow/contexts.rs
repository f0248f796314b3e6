// orderflow/src/workflow/contexts.rs

//! Working state of each workflow pipeline. Handlers receive these wrapped
//! in `ContextData`.

use super::stock::StockLedger;
use crate::catalog::CatalogClient;
use crate::enrichment::EnrichmentPool;
use crate::model::{CreateOrderRequest, Order, OrderId, OrderLine, Page, PageForm, Product, WorkflowContext};
use crate::store::{OrderLineStore, OrderStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Collaborators shared by every pipeline run.
#[derive(Clone)]
pub struct WorkflowDeps {
  pub orders: Arc<dyn OrderStore>,
  pub order_lines: Arc<dyn OrderLineStore>,
  pub catalog: Arc<dyn CatalogClient>,
  pub pool: EnrichmentPool,
  pub bulk_batch_size: usize,
}

pub struct CreateOrderCtxData {
  pub deps: WorkflowDeps,
  pub caller: WorkflowContext,
  pub request: CreateOrderRequest,
  /// Single timestamp for the order number, created_at and the lines.
  pub now: DateTime<Utc>,
  pub ledger: StockLedger,
  pub order: Option<Order>,
  pub lines: Vec<OrderLine>,
}

impl CreateOrderCtxData {
  pub fn new(deps: WorkflowDeps, caller: WorkflowContext, request: CreateOrderRequest) -> Self {
    Self {
      deps,
      caller,
      request,
      now: Utc::now(),
      ledger: StockLedger::default(),
      order: None,
      lines: Vec::new(),
    }
  }
}

pub struct CancelOrderCtxData {
  pub deps: WorkflowDeps,
  pub caller: WorkflowContext,
  pub order_id: OrderId,
  pub now: DateTime<Utc>,
  pub order: Option<Order>,
  pub lines: Vec<OrderLine>,
  pub ledger: StockLedger,
}

impl CancelOrderCtxData {
  pub fn new(deps: WorkflowDeps, caller: WorkflowContext, order_id: OrderId) -> Self {
    Self {
      deps,
      caller,
      order_id,
      now: Utc::now(),
      order: None,
      lines: Vec::new(),
      ledger: StockLedger::default(),
    }
  }
}

pub struct FindOneCtxData {
  pub deps: WorkflowDeps,
  pub caller: WorkflowContext,
  pub order_id: OrderId,
  pub order: Option<Order>,
  pub products: Vec<Product>,
}

impl FindOneCtxData {
  pub fn new(deps: WorkflowDeps, caller: WorkflowContext, order_id: OrderId) -> Self {
    Self {
      deps,
      caller,
      order_id,
      order: None,
      products: Vec::new(),
    }
  }
}

pub struct FindAllCtxData {
  pub deps: WorkflowDeps,
  pub caller: WorkflowContext,
  pub page_form: PageForm,
  pub page: Option<Page<Order>>,
  pub products: Vec<Product>,
}

impl FindAllCtxData {
  pub fn new(deps: WorkflowDeps, caller: WorkflowContext, page_form: PageForm) -> Self {
    Self {
      deps,
      caller,
      page_form,
      page: None,
      products: Vec::new(),
    }
  }
}
