//! Order lifecycle, pricing, and request types.

mod pricing;
mod requests;
mod service;
mod state;

pub use pricing::{PricingEngine, UnknownItemPolicy};
pub use requests::{CreateOrderRequest, LineItemRequest, UpdateOrderRequest};
pub use service::{OrderService, ServiceConfig};
pub use state::{StatusTransitions, check_transition};
