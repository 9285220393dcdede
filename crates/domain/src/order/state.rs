//! Order status state machine.
//!
//! ```text
//! Created ──► Paid ──► Delivered
//! ```
//!
//! Transitions move exactly one step forward. There are no skips, no
//! reverse moves, and no self-transitions.

use order_store::OrderStatus;

use crate::error::OrderError;

/// Transition rules over [`OrderStatus`].
pub trait StatusTransitions {
    /// Returns the only status reachable from this one, if any.
    fn next(&self) -> Option<OrderStatus>;

    /// Returns true if moving to `to` is a legal single step.
    fn can_transition_to(&self, to: OrderStatus) -> bool;

    /// Returns true if line items may still be replaced in this status.
    fn can_modify_items(&self) -> bool;

    /// Returns true if this is a terminal status.
    fn is_terminal(&self) -> bool;
}

impl StatusTransitions for OrderStatus {
    fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Created => Some(OrderStatus::Paid),
            OrderStatus::Paid => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    fn can_transition_to(&self, to: OrderStatus) -> bool {
        self.next() == Some(to)
    }

    fn can_modify_items(&self) -> bool {
        matches!(self, OrderStatus::Created)
    }

    fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

/// Checks that `from → to` is a legal transition.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(OrderError::InvalidStatusTransition { from, to })
    }
}
