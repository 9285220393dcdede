use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use common::RecordId;

use crate::{Money, Order, OrderPatch, OrderStatus, Result};

/// Persistence of order records.
///
/// All implementations must be thread-safe (Send + Sync). Calls may block on
/// network I/O; callers are expected to bound them with a deadline.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores a new order and returns its identifier.
    async fn insert(&self, order: Order) -> Result<RecordId>;

    /// Fetches an order by identifier.
    ///
    /// Returns None if the order doesn't exist.
    async fn find_by_id(&self, id: RecordId) -> Result<Option<Order>>;

    /// Applies a partial update and returns the number of records modified.
    ///
    /// When `expected_status` is set, the update only happens if the stored
    /// status still equals it; a mismatch or a missing order yields `0`.
    /// An empty patch never modifies anything.
    async fn update_fields(
        &self,
        id: RecordId,
        patch: OrderPatch,
        expected_status: Option<OrderStatus>,
    ) -> Result<u64>;
}

/// Authoritative source of catalog unit prices.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Resolves the unit price of every known item in `item_ids`.
    ///
    /// Unknown identifiers are simply absent from the result.
    async fn resolve_unit_prices(
        &self,
        item_ids: &HashSet<RecordId>,
    ) -> Result<HashMap<RecordId, Money>>;
}
