//! Domain error types.

use std::time::Duration;

use common::{ParseIdError, RecordId};
use order_store::{OrderStatus, StoreError};
use thiserror::Error;

/// Errors that can occur during order operations.
///
/// Every variant maps to a stable machine-readable code via [`OrderError::code`].
#[derive(Debug, Error)]
pub enum OrderError {
    /// A supplied identifier does not parse.
    #[error("{0}")]
    InvalidId(#[from] ParseIdError),

    /// The request payload is absent or carries no line items.
    #[error("No order provided")]
    OrderNotProvided,

    /// Lookup by id found no order.
    #[error("Order not found: {0}")]
    OrderNotFound(RecordId),

    /// A state-changing update modified zero records.
    #[error("Order not processed: {0}")]
    OrderNotProcessed(RecordId),

    /// An update request had no fields set.
    #[error("There are no updates")]
    UpdateNotSpecified,

    /// A line item asked for zero units.
    #[error("Invalid quantity {quantity} for item {item_id} (must be greater than 0)")]
    InvalidQuantity { item_id: RecordId, quantity: u64 },

    /// A line item references an item missing from the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(RecordId),

    /// Delivery was requested for an order that is not paid yet.
    #[error("Order isn't paid: {0}")]
    OrderNotPaid(RecordId),

    /// Delivery was requested for an order that is already delivered.
    #[error("Order already delivered: {0}")]
    OrderAlreadyDelivered(RecordId),

    /// The requested status does not follow from the current one.
    #[error("Invalid status transition: cannot move from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Line items can only be replaced before payment.
    #[error("Items can't be changed once the order is {status}")]
    ItemsLocked { status: OrderStatus },

    /// The computed total does not fit the money representation.
    #[error("Order total overflows")]
    TotalOverflow,

    /// A collaborator call did not finish within its deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// An error occurred in the order or catalog store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl OrderError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::InvalidId(_) => "invalid_id",
            OrderError::OrderNotProvided => "order_not_provided",
            OrderError::OrderNotFound(_) => "order_not_found",
            OrderError::OrderNotProcessed(_) => "order_not_processed",
            OrderError::UpdateNotSpecified => "update_not_specified",
            OrderError::InvalidQuantity { .. } => "order_quantity_invalid",
            OrderError::ItemNotFound(_) => "item_not_found",
            OrderError::OrderNotPaid(_) => "order_not_paid",
            OrderError::OrderAlreadyDelivered(_) => "order_delivered",
            OrderError::InvalidStatusTransition { .. } => "invalid_status_transition",
            OrderError::ItemsLocked { .. } => "order_items_locked",
            OrderError::TotalOverflow => "total_overflow",
            OrderError::Timeout { .. } | OrderError::Store(_) => "unknown_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let id = RecordId::new();
        assert_eq!(OrderError::OrderNotFound(id).code(), "order_not_found");
        assert_eq!(OrderError::OrderNotProcessed(id).code(), "order_not_processed");
        assert_eq!(OrderError::OrderNotProvided.code(), "order_not_provided");
        assert_eq!(OrderError::UpdateNotSpecified.code(), "update_not_specified");
        assert_eq!(
            OrderError::InvalidQuantity {
                item_id: id,
                quantity: 0
            }
            .code(),
            "order_quantity_invalid"
        );
        assert_eq!(
            OrderError::from(RecordId::parse("nope").unwrap_err()).code(),
            "invalid_id"
        );
        assert_eq!(
            OrderError::from(StoreError::Unavailable("down".into())).code(),
            "unknown_error"
        );
    }

    #[test]
    fn test_store_errors_pass_through_unmodified() {
        let err = OrderError::from(StoreError::Corrupt("bad status".into()));
        assert_eq!(err.to_string(), "Store error: Corrupt record: bad status");
    }
}
