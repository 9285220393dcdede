//! Order lifecycle operations: creation, lookup, payment, delivery, and
//! partial updates.

use std::time::Duration;

use chrono::Utc;
use common::RecordId;
use order_store::{CatalogLookup, Order, OrderPatch, OrderRepository, OrderStatus};

use crate::deadline::{DEFAULT_TIMEOUT, bounded};
use crate::error::OrderError;

use super::{
    CreateOrderRequest, PricingEngine, StatusTransitions, UnknownItemPolicy, UpdateOrderRequest,
    check_transition, requests::parse_line_items,
};

/// Tunables for [`OrderService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Deadline applied to every repository and catalog call.
    pub timeout: Duration,

    pub unknown_items: UnknownItemPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            unknown_items: UnknownItemPolicy::default(),
        }
    }
}

/// Service for managing orders.
///
/// Validates requests, prices them against the catalog, persists them, and
/// enforces the `created → paid → delivered` status machine. Status changes
/// are written with the expected current status as a precondition, so
/// concurrent transitions of the same order cannot both succeed.
pub struct OrderService<R, C> {
    repo: R,
    pricing: PricingEngine<C>,
    timeout: Duration,
}

impl<R: OrderRepository, C: CatalogLookup> OrderService<R, C> {
    /// Creates a new order service with default settings.
    pub fn new(repo: R, catalog: C) -> Self {
        Self::with_config(repo, catalog, ServiceConfig::default())
    }

    /// Creates a new order service with explicit settings.
    pub fn with_config(repo: R, catalog: C, config: ServiceConfig) -> Self {
        let pricing = PricingEngine::new(catalog)
            .with_unknown_items(config.unknown_items)
            .with_timeout(config.timeout);

        Self {
            repo,
            pricing,
            timeout: config.timeout,
        }
    }

    /// Places a new order and returns its identifier.
    ///
    /// Nothing is persisted unless every line item validates and prices.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_order(
        &self,
        request: Option<CreateOrderRequest>,
    ) -> Result<RecordId, OrderError> {
        let result = self.try_create_order(request).await;
        if let Ok(id) = &result {
            metrics::counter!("orders_created_total").increment(1);
            tracing::info!(order_id = %id, "order created");
        }
        observe("create_order", result)
    }

    async fn try_create_order(
        &self,
        request: Option<CreateOrderRequest>,
    ) -> Result<RecordId, OrderError> {
        let request = request.ok_or(OrderError::OrderNotProvided)?;
        if request.items.is_empty() {
            return Err(OrderError::OrderNotProvided);
        }

        let customer_id = RecordId::parse(&request.customer_id)?;
        let items = parse_line_items(&request.items)?;
        let total = self.pricing.compute_total(&items).await?;

        let order = Order {
            id: RecordId::new(),
            customer_id,
            items,
            total,
            status: OrderStatus::Created,
            created_at: Utc::now(),
        };

        bounded("insert", self.timeout, self.repo.insert(order)).await
    }

    /// Loads an order by its string identifier.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_info(&self, id: &str) -> Result<Order, OrderError> {
        let result = match RecordId::parse(id) {
            Ok(id) => self.load(id).await,
            Err(err) => Err(err.into()),
        };
        observe("get_order_info", result)
    }

    /// Moves an order from `created` to `paid`.
    ///
    /// Fails with [`OrderError::OrderNotProcessed`] if nothing was modified,
    /// which covers both a missing order and one that is no longer `created`.
    #[tracing::instrument(skip(self))]
    pub async fn pay_order(&self, id: &str) -> Result<(), OrderError> {
        let result = match RecordId::parse(id) {
            Ok(id) => {
                self.transition(id, OrderStatus::Created, OrderStatus::Paid)
                    .await
            }
            Err(err) => Err(err.into()),
        };
        observe("pay_order", result)
    }

    /// Moves an order from `paid` to `delivered`.
    #[tracing::instrument(skip(self))]
    pub async fn process_order(&self, id: &str) -> Result<(), OrderError> {
        let result = self.try_process_order(id).await;
        observe("process_order", result)
    }

    async fn try_process_order(&self, id: &str) -> Result<(), OrderError> {
        let id = RecordId::parse(id)?;
        let order = self.load(id).await?;
        match order.status {
            OrderStatus::Created => Err(OrderError::OrderNotPaid(id)),
            OrderStatus::Delivered => Err(OrderError::OrderAlreadyDelivered(id)),
            // A concurrent delivery between the load and the write shows up
            // as zero modified records.
            OrderStatus::Paid => {
                self.transition(id, OrderStatus::Paid, OrderStatus::Delivered)
                    .await
            }
        }
    }

    /// Applies the fields present in `request` and returns the modified count.
    ///
    /// A status change must be a legal single step of the state machine.
    /// Replacing items is only allowed while the order is `created`, and
    /// re-prices the order so its total keeps matching its items.
    #[tracing::instrument(skip(self, request))]
    pub async fn update_order(
        &self,
        id: &str,
        request: Option<UpdateOrderRequest>,
    ) -> Result<u64, OrderError> {
        let result = self.try_update_order(id, request).await;
        observe("update_order", result)
    }

    async fn try_update_order(
        &self,
        id: &str,
        request: Option<UpdateOrderRequest>,
    ) -> Result<u64, OrderError> {
        let request = request.ok_or(OrderError::OrderNotProvided)?;
        if request.is_empty() {
            return Err(OrderError::UpdateNotSpecified);
        }

        let id = RecordId::parse(id)?;
        let current = self.load(id).await?;
        let mut patch = OrderPatch::default();

        if let Some(status) = request.status {
            check_transition(current.status, status)?;
            patch.status = Some(status);
        }

        if let Some(items) = request.items {
            if !current.status.can_modify_items() {
                return Err(OrderError::ItemsLocked {
                    status: current.status,
                });
            }
            let items = parse_line_items(&items)?;
            patch.total = Some(self.pricing.compute_total(&items).await?);
            patch.items = Some(items);
        }

        let new_status = patch.status;
        let modified = bounded(
            "update_fields",
            self.timeout,
            self.repo.update_fields(id, patch, Some(current.status)),
        )
        .await?;

        if modified == 0 {
            return Err(OrderError::OrderNotProcessed(id));
        }
        if let Some(status) = new_status {
            record_transition(id, current.status, status);
        }
        Ok(modified)
    }

    async fn load(&self, id: RecordId) -> Result<Order, OrderError> {
        bounded("find_by_id", self.timeout, self.repo.find_by_id(id))
            .await?
            .ok_or(OrderError::OrderNotFound(id))
    }

    async fn transition(
        &self,
        id: RecordId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), OrderError> {
        let modified = bounded(
            "update_fields",
            self.timeout,
            self.repo
                .update_fields(id, OrderPatch::status(to), Some(from)),
        )
        .await?;

        if modified == 0 {
            return Err(OrderError::OrderNotProcessed(id));
        }
        record_transition(id, from, to);
        Ok(())
    }
}

fn record_transition(id: RecordId, from: OrderStatus, to: OrderStatus) {
    metrics::counter!("order_transitions_total", "to" => to.as_str()).increment(1);
    tracing::info!(order_id = %id, %from, %to, "order status changed");
}

fn observe<T>(operation: &'static str, result: Result<T, OrderError>) -> Result<T, OrderError> {
    if let Err(err) = &result {
        metrics::counter!("order_errors_total", "operation" => operation, "code" => err.code())
            .increment(1);
        match err {
            OrderError::Store(_) | OrderError::Timeout { .. } => {
                tracing::error!(operation, error = %err, "order operation failed");
            }
            _ => tracing::debug!(operation, error = %err, "order operation rejected"),
        }
    }
    result
}
