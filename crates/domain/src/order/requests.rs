//! Inbound order requests.
//!
//! Identifiers arrive as strings and are parsed here, so a malformed id is
//! rejected before anything touches the catalog or the repository.

use common::RecordId;
use order_store::{LineItem, OrderStatus};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// A requested line item, as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub item_id: String,
    pub quantity: u64,
}

impl LineItemRequest {
    pub fn new(item_id: impl ToString, quantity: u64) -> Self {
        Self {
            item_id: item_id.to_string(),
            quantity,
        }
    }

    /// Parses the item id and checks the quantity is positive.
    pub fn to_line_item(&self) -> Result<LineItem, OrderError> {
        let item_id = RecordId::parse(&self.item_id)?;
        if self.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                item_id,
                quantity: self.quantity,
            });
        }
        Ok(LineItem::new(item_id, self.quantity))
    }
}

/// Converts requested lines, keeping request order.
pub(crate) fn parse_line_items(items: &[LineItemRequest]) -> Result<Vec<LineItem>, OrderError> {
    items.iter().map(LineItemRequest::to_line_item).collect()
}

/// Request to place a new order.
///
/// Total and status are assigned by the server; any such fields in the
/// payload are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<LineItemRequest>,

    #[serde(default)]
    pub customer_id: String,
}

impl CreateOrderRequest {
    pub fn new(customer_id: impl ToString, items: Vec<LineItemRequest>) -> Self {
        Self {
            items,
            customer_id: customer_id.to_string(),
        }
    }
}

/// Partial update of an order. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub items: Option<Vec<LineItemRequest>>,

    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl UpdateOrderRequest {
    /// Creates an update that only sets the status.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            items: None,
            status: Some(status),
        }
    }

    /// Creates an update that only replaces the line items.
    pub fn items(items: Vec<LineItemRequest>) -> Self {
        Self {
            items: Some(items),
            status: None,
        }
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.items.is_none() && self.status.is_none()
    }
}
