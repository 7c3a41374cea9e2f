//! Parsed order content before an id is assigned

use crate::error::ParseError;
use order_types::{checked_total, LineItem, OrderId, OrderRecord, OrderType};
use rust_decimal::Decimal;

/// Everything read from an order file except the id
///
/// The id is only allocated once a draft exists, so a failed parse never
/// consumes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    /// Epoch milliseconds from the file
    pub placed_at: i64,
    /// Order type from the file
    pub order_type: OrderType,
    /// Line items in file order
    pub items: Vec<LineItem>,
    /// Source label given by the file itself, if any
    pub company: Option<String>,
}

impl OrderDraft {
    /// Exact order total; fails if the line items overflow a decimal
    pub fn total(&self) -> Result<Decimal, ParseError> {
        checked_total(&self.items).ok_or_else(|| ParseError::invalid("price", "order total out of range"))
    }

    /// Finish the draft into a waiting order with a computed total
    pub fn into_record(self, id: OrderId) -> OrderRecord {
        let mut record = OrderRecord::new(id, self.order_type, self.placed_at, self.items);
        record.set_company(self.company);
        record
    }
}

pub(crate) fn quantity(raw: u64) -> Result<u32, ParseError> {
    match u32::try_from(raw) {
        Ok(q) if q > 0 => Ok(q),
        _ => Err(ParseError::invalid("quantity", raw)),
    }
}

pub(crate) fn price(value: Decimal) -> Result<Decimal, ParseError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ParseError::invalid("price", value));
    }
    Ok(value)
}

pub(crate) fn order_type(raw: &str) -> Result<OrderType, ParseError> {
    raw.parse().map_err(ParseError::UnknownType)
}
