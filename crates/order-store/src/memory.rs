use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::RecordId;
use tokio::sync::RwLock;

use crate::{
    CatalogItem, Money, Order, OrderPatch, OrderStatus, Result, StoreError,
    store::{CatalogLookup, OrderRepository},
};

#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    latency: Option<Duration>,
}

impl Faults {
    async fn check(faults: &RwLock<Faults>) -> Result<()> {
        let (unavailable, latency) = {
            let faults = faults.read().await;
            (faults.unavailable, faults.latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if unavailable {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }
}

/// In-memory order repository for testing and database-less runs.
///
/// Provides the same semantics as the PostgreSQL implementation, including
/// the status precondition on updates.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<RecordId, Order>>>,
    faults: Arc<RwLock<Faults>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.faults.write().await.unavailable = unavailable;
    }

    /// Delays every subsequent call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.faults.write().await.latency = latency;
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: Order) -> Result<RecordId> {
        Faults::check(&self.faults).await?;

        let id = order.id;
        self.orders.write().await.insert(id, order);
        Ok(id)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Order>> {
        Faults::check(&self.faults).await?;

        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn update_fields(
        &self,
        id: RecordId,
        patch: OrderPatch,
        expected_status: Option<OrderStatus>,
    ) -> Result<u64> {
        Faults::check(&self.faults).await?;

        if patch.is_empty() {
            return Ok(0);
        }

        // Check and write under one lock so the precondition is atomic.
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(expected) = expected_status
            && order.status != expected
        {
            return Ok(0);
        }

        patch.apply_to(order);
        Ok(1)
    }
}

/// In-memory item catalog.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    items: Arc<RwLock<HashMap<RecordId, CatalogItem>>>,
    faults: Arc<RwLock<Faults>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item with a fresh identifier and returns it.
    pub async fn add_item(&self, name: impl Into<String>, price: Money) -> RecordId {
        let id = RecordId::new();
        self.items.write().await.insert(
            id,
            CatalogItem {
                id,
                name: name.into(),
                price,
            },
        );
        id
    }

    /// Changes the price of an existing item. Returns false if it is unknown.
    pub async fn set_price(&self, id: RecordId, price: Money) -> bool {
        match self.items.write().await.get_mut(&id) {
            Some(item) => {
                item.price = price;
                true
            }
            None => false,
        }
    }

    /// Returns a copy of an item.
    pub async fn get_item(&self, id: RecordId) -> Option<CatalogItem> {
        self.items.read().await.get(&id).cloned()
    }

    /// Makes every subsequent lookup fail with [`StoreError::Unavailable`].
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.faults.write().await.unavailable = unavailable;
    }

    /// Delays every subsequent lookup by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.faults.write().await.latency = latency;
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn resolve_unit_prices(
        &self,
        item_ids: &HashSet<RecordId>,
    ) -> Result<HashMap<RecordId, Money>> {
        Faults::check(&self.faults).await?;

        let items = self.items.read().await;
        Ok(item_ids
            .iter()
            .filter_map(|id| items.get(id).map(|item| (*id, item.price)))
            .collect())
    }
}
