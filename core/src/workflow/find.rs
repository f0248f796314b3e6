// orderflow/src/workflow/find.rs

//! Read paths. Neither pipeline writes to the store or pushes to the catalog.

use super::common_steps::{self, distinct_ids, persistence_failure};
use super::contexts::{FindAllCtxData, FindOneCtxData};
use crate::core::{ContextData, PipelineControl};
use crate::error::{OrderError, OrderResult, PipelineError};
use crate::model::OrderFilter;
use crate::pipeline::Pipeline;
use tokio::task;
use tracing::debug;

const FIND_ONE: &str = "find_one_order";
const FIND_ALL: &str = "find_all_orders";

pub(crate) fn build_find_one_pipeline() -> Pipeline<FindOneCtxData, OrderError> {
  let mut p = Pipeline::new(
    FIND_ONE,
    &[
      ("load_order", false, None),
      ("authorize_owner", false, None),
      ("fetch_products", false, None),
      ("enrich_lines", false, None),
    ],
  );
  p.on_root("load_order", load_order);
  p.on_root("authorize_owner", authorize_owner);
  p.on_root("fetch_products", fetch_line_products);
  p.on_root("enrich_lines", enrich_lines);
  p
}

pub(crate) fn build_find_all_pipeline() -> Pipeline<FindAllCtxData, OrderError> {
  let mut p = Pipeline::new(
    FIND_ALL,
    &[
      ("load_page", false, None),
      ("fetch_products", false, None),
      ("enrich_orders", false, None),
    ],
  );
  p.on_root("load_page", load_page);
  p.on_root("fetch_products", fetch_page_products);
  p.on_root("enrich_orders", enrich_orders);
  p
}

fn missing(pipeline: &'static str, what: &'static str) -> OrderError {
  PipelineError::MissingOutput { pipeline, missing: what }.into()
}

async fn load_order(ctx: ContextData<FindOneCtxData>) -> OrderResult<PipelineControl> {
  let (deps, order_id) = {
    let guard = ctx.read();
    (guard.deps.clone(), guard.order_id)
  };
  let order = common_steps::load_order(&deps, FIND_ONE, order_id).await?;
  ctx.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

async fn authorize_owner(ctx: ContextData<FindOneCtxData>) -> OrderResult<PipelineControl> {
  let guard = ctx.read();
  let order = guard.order.as_ref().ok_or_else(|| missing(FIND_ONE, "loaded order"))?;
  common_steps::authorize_owner(order, guard.caller.user_id)?;
  Ok(PipelineControl::Continue)
}

/// An order without lines is returned as loaded.
async fn fetch_line_products(ctx: ContextData<FindOneCtxData>) -> OrderResult<PipelineControl> {
  let (deps, ids, language) = {
    let guard = ctx.read();
    let order = guard.order.as_ref().ok_or_else(|| missing(FIND_ONE, "loaded order"))?;
    (
      guard.deps.clone(),
      distinct_ids(order.order_lines.iter().map(|line| line.product_id)),
      guard.caller.language.clone(),
    )
  };
  if ids.is_empty() {
    return Ok(PipelineControl::Stop);
  }
  let products = common_steps::lookup_products(&deps, FIND_ONE, &ids, &language).await?;
  ctx.write().products = products;
  Ok(PipelineControl::Continue)
}

/// The order is taken out of the context while the pool works on it.
async fn enrich_lines(ctx: ContextData<FindOneCtxData>) -> OrderResult<PipelineControl> {
  let (pool, mut order, products) = {
    let mut guard = ctx.write();
    let order = guard.order.take().ok_or_else(|| missing(FIND_ONE, "loaded order"))?;
    (guard.deps.pool.clone(), order, std::mem::take(&mut guard.products))
  };
  let order = task::spawn_blocking(move || {
    pool.enrich_lines(&mut order.order_lines, &products);
    order
  })
  .await?;
  ctx.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

async fn load_page(ctx: ContextData<FindAllCtxData>) -> OrderResult<PipelineControl> {
  let (deps, filter) = {
    let guard = ctx.read();
    let filter = OrderFilter {
      owner_id: guard.caller.user_id,
      page_form: guard.page_form,
    };
    (guard.deps.clone(), filter)
  };
  let page = deps
    .orders
    .find_page(&filter)
    .await
    .map_err(|e| persistence_failure(FIND_ALL, &format!("orders of user {}", filter.owner_id), e))?;
  debug!(
    owner_id = filter.owner_id,
    returned = page.entities.len(),
    total = page.page_information.total_number_of_entities,
    "Order page loaded."
  );
  ctx.write().page = Some(page);
  Ok(PipelineControl::Continue)
}

/// Products are fetched once for the whole page.
async fn fetch_page_products(ctx: ContextData<FindAllCtxData>) -> OrderResult<PipelineControl> {
  let (deps, ids, language) = {
    let guard = ctx.read();
    let page = guard.page.as_ref().ok_or_else(|| missing(FIND_ALL, "order page"))?;
    let ids = distinct_ids(
      page
        .entities
        .iter()
        .flat_map(|order| order.order_lines.iter().map(|line| line.product_id)),
    );
    (guard.deps.clone(), ids, guard.caller.language.clone())
  };
  if ids.is_empty() {
    return Ok(PipelineControl::Stop);
  }
  let products = common_steps::lookup_products(&deps, FIND_ALL, &ids, &language).await?;
  ctx.write().products = products;
  Ok(PipelineControl::Continue)
}

async fn enrich_orders(ctx: ContextData<FindAllCtxData>) -> OrderResult<PipelineControl> {
  let (pool, mut page, products) = {
    let mut guard = ctx.write();
    let page = guard.page.take().ok_or_else(|| missing(FIND_ALL, "order page"))?;
    (guard.deps.pool.clone(), page, std::mem::take(&mut guard.products))
  };
  let page = task::spawn_blocking(move || {
    pool.enrich_orders(&mut page.entities, &products);
    page
  })
  .await?;
  ctx.write().page = Some(page);
  Ok(PipelineControl::Continue)
}
