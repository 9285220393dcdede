//! Domain layer for the shop order service.
//!
//! This crate provides:
//! - Pricing of line items against catalog unit prices
//! - The `created → paid → delivered` order status machine
//! - `OrderService`, which creates, loads, pays, delivers, and patches orders
//! - The `OrderError` taxonomy with stable error codes

mod deadline;
pub mod error;
pub mod order;

pub use common::RecordId;
pub use deadline::DEFAULT_TIMEOUT;
pub use error::OrderError;
pub use order::{
    CreateOrderRequest, LineItemRequest, OrderService, PricingEngine, ServiceConfig,
    StatusTransitions, UnknownItemPolicy, UpdateOrderRequest, check_transition,
};
pub use order_store::{LineItem, Money, Order, OrderStatus};
