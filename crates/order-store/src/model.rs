//! Persisted shapes of orders, line items, and catalog prices.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use common::RecordId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns the amount as a decimal number of currency units.
    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Adds another amount, returning `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.cents.checked_add(other.cents).map(Money::from_cents)
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    pub fn checked_mul(&self, quantity: u64) -> Option<Money> {
        let quantity = i64::try_from(quantity).ok()?;
        self.cents.checked_mul(quantity).map(Money::from_cents)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

/// Status of an order.
///
/// ```text
/// Created ──► Paid ──► Delivered
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order has been placed and priced, awaiting payment.
    #[default]
    Created,

    /// Payment received, awaiting delivery.
    Paid,

    /// Order has been delivered (terminal state).
    Delivered,
}

impl OrderStatus {
    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The string is not a known order status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown order status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(OrderStatus::Created),
            "paid" => Ok(OrderStatus::Paid),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A catalog reference and the quantity ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The catalog item being ordered.
    pub item_id: RecordId,

    /// Quantity ordered.
    pub quantity: u64,
}

impl LineItem {
    pub fn new(item_id: RecordId, quantity: u64) -> Self {
        Self { item_id, quantity }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    pub customer_id: RecordId,

    /// Line items in request order.
    pub items: Vec<LineItem>,

    /// Snapshot of the priced total, never recomputed on read.
    pub total: Money,

    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Partial update of an order. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub items: Option<Vec<LineItem>>,
    pub total: Option<Money>,
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    /// Creates a patch that only sets the status.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Returns true if no field would be written.
    pub fn is_empty(&self) -> bool {
        self.items.is_none() && self.total.is_none() && self.status.is_none()
    }

    /// Writes every present field into `order`.
    pub fn apply_to(self, order: &mut Order) {
        if let Some(items) = self.items {
            order.items = items;
        }
        if let Some(total) = self.total {
            order.total = total;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
    }
}

/// An entry in the item catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: RecordId,
    pub name: String,
    pub price: Money,
}
