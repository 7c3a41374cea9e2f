//! OrderType and OrderStatus enums

use crate::error::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the customer receives the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Packed to go, handed over the counter
    #[serde(rename = "togo", alias = "to-go", alias = "to_go")]
    ToGo,
    /// Collected by the customer later
    #[serde(rename = "pickup")]
    Pickup,
    /// Driven out to the customer
    #[serde(rename = "delivery")]
    Delivery,
}

impl OrderType {
    /// All variants, in declaration order
    pub const ALL: [OrderType; 3] = [Self::ToGo, Self::Pickup, Self::Delivery];

    /// Returns the name used in order files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToGo => "togo",
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = UnknownVariant;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "togo" | "to-go" | "to_go" | "to go" => Ok(Self::ToGo),
            "pickup" | "pick-up" | "pick_up" => Ok(Self::Pickup),
            "delivery" => Ok(Self::Delivery),
            _ => Err(UnknownVariant::new("order type", s)),
        }
    }
}

/// Where an order is in its lifecycle
///
/// ```text
/// Waiting ──start──▶ InProgress ──complete──▶ Completed
///    ▲ │                 │
///    │ └─────cancel──────┴──────▶ Cancelled
///    └────────uncancel / undo──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    /// Received, not yet started
    #[default]
    Waiting,
    /// Being prepared
    #[serde(alias = "in-progress", alias = "in_progress")]
    InProgress,
    /// Handed over; terminal
    Completed,
    /// Cancelled; may return to `Waiting` via uncancel or undo
    #[serde(alias = "canceled")]
    Cancelled,
}

impl OrderStatus {
    /// All variants, in lifecycle order
    pub const ALL: [OrderStatus; 4] = [
        Self::Waiting,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the name used in exported files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Check if the order still needs kitchen attention
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Waiting | Self::InProgress)
    }

    /// Check if no operation can move the order any more
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "waiting" => Ok(Self::Waiting),
            "inprogress" | "in-progress" | "in_progress" | "in progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(UnknownVariant::new("order status", s)),
        }
    }
}
