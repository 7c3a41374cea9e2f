//! Order lifecycle transitions
//!
//! | Transition | From                   | To         |
//! |------------|------------------------|------------|
//! | `Start`    | Waiting                | InProgress |
//! | `Complete` | InProgress             | Completed  |
//! | `Cancel`   | Waiting or InProgress  | Cancelled  |
//! | `Uncancel` | Cancelled              | Waiting    |
//!
//! Anything else is rejected. `Completed` has no outgoing edge.

use crate::enums::OrderStatus;
use std::fmt;

/// A requested lifecycle move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Begin preparing a waiting order
    Start,
    /// Finish an order in progress
    Complete,
    /// Cancel an order that is not completed
    Cancel,
    /// Put a cancelled order back in the queue
    Uncancel,
}

impl Transition {
    /// Status reached by applying this transition to `from`, or `None` when
    /// the move is not allowed.
    pub fn target(self, from: OrderStatus) -> Option<OrderStatus> {
        match (self, from) {
            (Self::Start, OrderStatus::Waiting) => Some(OrderStatus::InProgress),
            (Self::Complete, OrderStatus::InProgress) => Some(OrderStatus::Completed),
            (Self::Cancel, OrderStatus::Waiting | OrderStatus::InProgress) => {
                Some(OrderStatus::Cancelled)
            }
            (Self::Uncancel, OrderStatus::Cancelled) => Some(OrderStatus::Waiting),
            _ => None,
        }
    }

    /// Check if the transition is allowed from `from`
    pub fn is_allowed(self, from: OrderStatus) -> bool {
        self.target(from).is_some()
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Complete => write!(f, "complete"),
            Self::Cancel => write!(f, "cancel"),
            Self::Uncancel => write!(f, "uncancel"),
        }
    }
}
