//! FoodHub JSON order files
//!
//! ```json
//! { "order": { "order_date": 1758027600000, "type": "togo",
//!              "items": [ {"name": "Burger", "quantity": 1, "price": 4.39} ] } }
//! ```

use crate::draft::{self, OrderDraft};
use crate::error::ParseError;
use order_types::export::decimal_number;
use order_types::LineItem;
use serde_json::{Map, Value};

/// Parse the text of a JSON order file
pub fn parse_json(text: &str) -> Result<OrderDraft, ParseError> {
    let root: Value = serde_json::from_str(text)?;
    let order = required(root.as_object(), "order")?
        .as_object()
        .ok_or_else(|| ParseError::Structure("`order` is not an object".to_string()))?;

    let date = required(Some(order), "order_date")?;
    let placed_at = date
        .as_i64()
        .ok_or_else(|| ParseError::invalid("order_date", date))?;

    let order_type = required(Some(order), "type")?
        .as_str()
        .ok_or_else(|| ParseError::Structure("`type` is not a string".to_string()))
        .and_then(draft::order_type)?;

    let items = required(Some(order), "items")?
        .as_array()
        .ok_or_else(|| ParseError::Structure("`items` is not an array".to_string()))?
        .iter()
        .map(parse_item)
        .collect::<Result<Vec<_>, _>>()?;

    let company = order
        .get("company")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(OrderDraft {
        placed_at,
        order_type,
        items,
        company,
    })
}

fn parse_item(value: &Value) -> Result<LineItem, ParseError> {
    let item = value
        .as_object()
        .ok_or_else(|| ParseError::Structure("item is not an object".to_string()))?;

    let name = required(Some(item), "name")?
        .as_str()
        .ok_or_else(|| ParseError::Structure("item `name` is not a string".to_string()))?;

    let qty = required(Some(item), "quantity")?;
    let quantity = qty
        .as_u64()
        .ok_or_else(|| ParseError::invalid("quantity", qty))
        .and_then(draft::quantity)?;

    let price = match required(Some(item), "price")? {
        Value::Number(n) => decimal_number::parse(&n.to_string())
            .map_err(|_| ParseError::invalid("price", n))?,
        other => return Err(ParseError::invalid("price", other)),
    };

    Ok(LineItem::new(name, quantity, draft::price(price)?))
}

/// Look up a field, treating `null` the same as absent
fn required<'a>(
    object: Option<&'a Map<String, Value>>,
    field: &'static str,
) -> Result<&'a Value, ParseError> {
    match object.and_then(|o| o.get(field)) {
        None | Some(Value::Null) => Err(ParseError::MissingField { field }),
        Some(value) => Ok(value),
    }
}
