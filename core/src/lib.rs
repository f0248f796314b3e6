// src/lib.rs

//! orderflow: the order lifecycle of a shop backend as async step pipelines.
//!
//! Creating an order validates stock against a remote product catalog,
//! persists the order and its lines, and pushes the debited stock back in a
//! single bulk update. Cancelling is the exact inverse. Reads enrich each
//! order line with its current catalog product on a bounded worker pool.
//!
//! The crate is organized as:
//!  - `core` and `pipeline`: a small engine running named async steps over
//!    a shared, lockable context.
//!  - `workflow`: the four order operations built on that engine.
//!  - `catalog` and `store`: the ports to the product service and to
//!    persistence, with an HTTP client and in-memory adapters.
//!  - `enrichment`: the worker pool attaching products to order lines.

pub mod catalog;
pub mod config;
pub mod core;
pub mod enrichment;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod store;
pub mod workflow;

// --- Re-exports for the Public API ---

pub use crate::core::{ContextData, PipelineControl, PipelineResult, SkipCondition, StepDef};
pub use crate::pipeline::Pipeline;

pub use crate::catalog::{CatalogClient, CatalogError, HttpCatalogClient, InMemoryCatalog};
pub use crate::config::{CatalogConfig, ConfigError, WorkflowConfig};
pub use crate::enrichment::EnrichmentPool;
pub use crate::error::{OrderError, OrderResult, PipelineError};
pub use crate::model::{
  CreateOrderRequest, Order, OrderLine, OrderLineRequest, OrderStatus, Page, PageForm, Product, WorkflowContext,
};
pub use crate::store::{MemoryStore, OrderLineStore, OrderStore};
pub use crate::workflow::OrderWorkflow;
