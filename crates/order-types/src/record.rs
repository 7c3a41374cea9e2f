//! Canonical order record
//!
//! An [`OrderRecord`] is what every ingest format is converted into. Its id is
//! fixed at construction and its total always equals the sum of its line
//! items, except for records rebuilt from an export with [`OrderRecord::restored`],
//! where the stored total is trusted.

use crate::display::{status_label, type_label};
use crate::enums::{OrderStatus, OrderType};
use crate::lifecycle::Transition;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique order number, assigned once and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u32);

impl OrderId {
    /// Wrap a raw order number
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw order number
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One line on an order ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Menu item name
    pub name: String,
    /// Number of units (positive)
    pub quantity: u32,
    /// Price of a single unit (non-negative)
    pub unit_price: Decimal,
}

impl LineItem {
    /// Create a new line item
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Line value (quantity * unit price), saturating at the decimal range
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    /// Line value, or `None` if it does not fit in a decimal
    pub fn checked_subtotal(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// A single order as tracked by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    id: OrderId,
    placed_at: i64,
    order_type: OrderType,
    status: OrderStatus,
    items: Vec<LineItem>,
    total_price: Decimal,
    company: Option<String>,
    source: Option<String>,
}

impl OrderRecord {
    /// Create a new waiting order; the total is computed from `items`
    pub fn new(id: OrderId, order_type: OrderType, placed_at: i64, items: Vec<LineItem>) -> Self {
        let total_price = sum_items(&items);
        Self {
            id,
            placed_at,
            order_type,
            status: OrderStatus::Waiting,
            items,
            total_price,
            company: None,
            source: None,
        }
    }

    /// Rebuild an order from previously exported state
    ///
    /// Nothing is recomputed: status and total are taken exactly as given.
    pub fn restored(
        id: OrderId,
        placed_at: i64,
        total_price: Decimal,
        order_type: OrderType,
        status: OrderStatus,
        items: Vec<LineItem>,
    ) -> Self {
        Self {
            id,
            placed_at,
            order_type,
            status,
            items,
            total_price,
            company: None,
            source: None,
        }
    }

    /// Attach a source label
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Order id
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Time the order was placed (epoch milliseconds, from the source file)
    pub fn placed_at(&self) -> i64 {
        self.placed_at
    }

    /// Placed-at time as a UTC timestamp, if in range
    pub fn placed_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.placed_at)
    }

    /// Order type
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Current lifecycle status
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Line items in ticket order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Order total
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Source label, e.g. the ordering system that produced the file
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Replace the source label
    pub fn set_company(&mut self, company: Option<String>) {
        self.company = company;
    }

    /// Name of the import file the order was read from
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Replace the import file name
    pub fn set_source(&mut self, source: Option<String>) {
        self.source = source;
    }

    /// Append a line item and recompute the total
    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(item);
        self.total_price = sum_items(&self.items);
    }

    /// Sum of the line items, independent of the stored total
    pub fn computed_total(&self) -> Decimal {
        sum_items(&self.items)
    }

    /// Apply a lifecycle transition
    ///
    /// Returns the previous status when the transition was allowed, `None`
    /// (and leaves the record untouched) otherwise.
    pub fn apply(&mut self, transition: Transition) -> Option<OrderStatus> {
        let next = transition.target(self.status)?;
        let previous = self.status;
        self.status = next;
        Some(previous)
    }
}

impl fmt::Display for OrderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order {}", self.id)?;
        match self.placed_at_utc() {
            Some(ts) => writeln!(f, "{}", ts.format("%Y-%m-%d %H:%M UTC"))?,
            None => writeln!(f, "{} ms", self.placed_at)?,
        }
        writeln!(f)?;
        writeln!(f, "Status: {}", status_label(self.status))?;
        writeln!(f, "Type: {}", type_label(self.order_type))?;
        writeln!(f, "Items:")?;
        for item in &self.items {
            writeln!(f, "  {} x {} @ ${:.2}", item.quantity, item.name, item.unit_price)?;
        }
        write!(f, "\nTotal Price: ${:.2}", self.total_price)
    }
}

fn sum_items(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(LineItem::subtotal)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Exact sum of the line items, or `None` on overflow
pub fn checked_total(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.checked_subtotal()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn burger_order() -> OrderRecord {
        OrderRecord::new(
            OrderId::new(1),
            OrderType::ToGo,
            1758027600000,
            vec![
                LineItem::new("Burger", 1, dec!(4.39)),
                LineItem::new("Fries", 2, dec!(3.09)),
            ],
        )
    }

    #[test]
    fn test_new_order_defaults() {
        let order = burger_order();
        assert_eq!(order.status(), OrderStatus::Waiting);
        assert_eq!(order.total_price(), dec!(10.57));
        assert_eq!(order.company(), None);
        assert_eq!(order.items()[1].name, "Fries");
    }

    #[test]
    fn test_add_item_recomputes_total() {
        let mut order = burger_order();
        order.add_item(LineItem::new("Milkshake", 1, dec!(5.09)));
        assert_eq!(order.total_price(), dec!(15.66));
        assert_eq!(order.items().len(), 3);
        assert_eq!(order.items()[2].name, "Milkshake");
    }

    #[test]
    fn test_restored_trusts_total() {
        let order = OrderRecord::restored(
            OrderId::new(9),
            1758027600000,
            dec!(99.99),
            OrderType::Pickup,
            OrderStatus::Completed,
            vec![LineItem::new("Soup", 1, dec!(3.00))],
        );
        assert_eq!(order.total_price(), dec!(99.99));
        assert_eq!(order.computed_total(), dec!(3.00));
        assert_eq!(order.status(), OrderStatus::Completed);
    }

    #[test]
    fn test_apply_transition() {
        let mut order = burger_order();
        assert_eq!(order.apply(Transition::Complete), None);
        assert_eq!(order.status(), OrderStatus::Waiting);

        assert_eq!(order.apply(Transition::Start), Some(OrderStatus::Waiting));
        assert_eq!(order.apply(Transition::Complete), Some(OrderStatus::InProgress));
        assert_eq!(order.apply(Transition::Cancel), None);
        assert_eq!(order.status(), OrderStatus::Completed);
    }

    #[test]
    fn test_display_summary() {
        let order = burger_order().with_company("FoodHub");
        let text = order.to_string();
        assert!(text.starts_with("Order #1\n2025-09-16 13:00 UTC"));
        assert!(text.contains("Type: To-go"));
        assert!(text.contains("2 x Fries @ $3.09"));
        assert!(text.ends_with("Total Price: $10.57"));
    }

    #[test]
    fn test_oversized_totals_do_not_panic() {
        let huge = LineItem::new("Gold", u32::MAX, Decimal::MAX);
        assert_eq!(huge.checked_subtotal(), None);
        assert_eq!(huge.subtotal(), Decimal::MAX);

        let items = vec![huge.clone(), LineItem::new("Fries", 2, dec!(3.09))];
        assert_eq!(checked_total(&items), None);
        assert_eq!(checked_total(&items[1..]), Some(dec!(6.18)));

        let order = OrderRecord::new(OrderId::new(1), OrderType::ToGo, 0, items);
        assert_eq!(order.total_price(), Decimal::MAX);
    }

    #[test]
    fn test_order_id_display() {
        assert_eq!(OrderId::new(42).to_string(), "#42");
        assert_eq!(OrderId::from(7).get(), 7);
    }
}
