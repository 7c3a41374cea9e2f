//! Shared types for order ingestion and tracking
//!
//! This crate provides the core type definitions used across the order
//! tracking workspace. It has no async or filesystem dependencies and can be used
//! independently.
//!
//! # Key Types
//!
//! - [`OrderRecord`] - Canonical order with id, type, status and line items
//! - [`LineItem`] - Name, quantity and unit price of one ticket line
//! - [`OrderType`], [`OrderStatus`] - Closed enumerations
//! - [`Transition`] - Lifecycle moves and the table that allows them
//! - [`ExportedOrder`] - Canonical JSON export format

pub mod display;
pub mod enums;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod record;

// Re-export commonly used types
pub use display::{status_label, type_label};
pub use enums::*;
pub use error::*;
pub use export::{ExportedItem, ExportedOrder};
pub use lifecycle::Transition;
pub use record::{checked_total, LineItem, OrderId, OrderRecord};

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
