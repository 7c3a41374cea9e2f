//! Human-facing labels for order screens
//!
//! Kept apart from the enums so the wire names (`togo`, `inProgress`) and the
//! labels shown to kitchen staff can change independently.

use crate::enums::{OrderStatus, OrderType};

/// Label for an order type
pub fn type_label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::ToGo => "To-go",
        OrderType::Pickup => "Pickup",
        OrderType::Delivery => "Delivery",
    }
}

/// Label for an order status
pub fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Waiting => "Waiting",
        OrderStatus::InProgress => "In progress",
        OrderStatus::Completed => "Completed",
        OrderStatus::Cancelled => "Cancelled",
    }
}
