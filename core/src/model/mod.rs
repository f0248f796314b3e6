// orderflow/src/model/mod.rs

//! Order, order line, product and pagination types exchanged by the workflow.

pub mod order;
pub mod order_line;
pub mod page;
pub mod product;
pub mod request;

pub use order::{Order, OrderStatus, ORDER_NUMBER_PREFIX, ORDER_NUMBER_TIME_FORMAT};
pub use order_line::OrderLine;
pub use page::{OrderFilter, Page, PageForm, PageInformation};
pub use product::{Message, Product};
pub use request::{CreateOrderRequest, OrderLineRequest, WorkflowContext};

pub type OrderId = u64;
pub type OrderLineId = u64;
pub type ProductId = u64;
pub type UserId = u64;
