//! Storage collaborators of the order service: the order repository and
//! the catalog price lookup, with in-memory and PostgreSQL adapters.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use common::RecordId;
pub use error::{Result, StoreError};
pub use memory::{InMemoryCatalog, InMemoryOrderRepository};
pub use model::{CatalogItem, LineItem, Money, Order, OrderPatch, OrderStatus, UnknownStatus};
pub use postgres::{PostgresCatalog, PostgresOrderRepository, run_migrations};
pub use store::{CatalogLookup, OrderRepository};
