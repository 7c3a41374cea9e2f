//! Canonical export format
//!
//! One JSON object per order:
//!
//! ```json
//! {
//!     "orderID": 1,
//!     "date": 1758027600000,
//!     "totalPrice": 10.57,
//!     "type": "togo",
//!     "status": "waiting",
//!     "company": "FoodHub",
//!     "source": "burger.json",
//!     "foodList": [{"name": "Burger", "quantity": 1, "price": 4.39}]
//! }
//! ```

use crate::enums::{OrderStatus, OrderType};
use crate::record::{LineItem, OrderId, OrderRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Serialized form of an [`OrderRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedOrder {
    #[serde(rename = "orderID")]
    pub order_id: OrderId,
    pub date: i64,
    #[serde(rename = "totalPrice", with = "decimal_number")]
    pub total_price: Decimal,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub status: OrderStatus,
    #[serde(default)]
    pub company: Option<String>,
    /// Import file name, used to skip the file when the import directory is rescanned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "foodList", default)]
    pub food_list: Vec<ExportedItem>,
}

/// Serialized form of a [`LineItem`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedItem {
    pub name: String,
    pub quantity: u32,
    #[serde(with = "decimal_number")]
    pub price: Decimal,
}

impl From<&OrderRecord> for ExportedOrder {
    fn from(order: &OrderRecord) -> Self {
        Self {
            order_id: order.id(),
            date: order.placed_at(),
            total_price: order.total_price(),
            order_type: order.order_type(),
            status: order.status(),
            company: order.company().map(str::to_string),
            source: order.source().map(str::to_string),
            food_list: order.items().iter().map(ExportedItem::from).collect(),
        }
    }
}

impl From<&LineItem> for ExportedItem {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.unit_price,
        }
    }
}

impl ExportedOrder {
    /// Rebuild the record verbatim: same id, same status, same total
    pub fn into_record(self) -> OrderRecord {
        let items = self
            .food_list
            .into_iter()
            .map(|i| LineItem::new(i.name, i.quantity, i.price))
            .collect();
        let mut record = OrderRecord::restored(
            self.order_id,
            self.date,
            self.total_price,
            self.order_type,
            self.status,
            items,
        );
        record.set_company(self.company);
        record.set_source(self.source);
        record
    }
}

/// Decimals as plain JSON numbers
///
/// Older exports wrote the total as a formatted string (`"10.57"`), so both
/// forms are accepted when reading. A value that an `f64` cannot carry
/// exactly is written as a string so it reads back unchanged.
pub mod decimal_number {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(serde_json::Number),
        String(String),
    }

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let float = value
            .to_f64()
            .ok_or_else(|| S::Error::custom(format!("decimal {value} out of range")))?;
        if parse(&float.to_string()).is_ok_and(|exact| exact == *value) {
            serializer.serialize_f64(float)
        } else {
            serializer.serialize_str(&value.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let text = match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::String(s) => s,
        };
        parse(&text).map_err(D::Error::custom)
    }

    /// Parse a decimal from its JSON text, accepting exponent notation
    pub fn parse(text: &str) -> Result<Decimal, rust_decimal::Error> {
        let text = text.trim();
        Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text))
    }
}
