//! GrubStop XML order files
//!
//! ```xml
//! <Orders>
//!   <Order id="1758038400000">
//!     <OrderType>pickup</OrderType>
//!     <Item type="Grilled Cheese">
//!       <Price>4.39</Price>
//!       <Quantity>1</Quantity>
//!     </Item>
//!   </Order>
//! </Orders>
//! ```
//!
//! The `Orders` wrapper is optional. The `id` attribute carries the placed-at
//! time in epoch milliseconds; `date` is accepted in its place, as are `Type`
//! for `OrderType` and `name` for the item's `type` attribute.

use crate::draft::{self, OrderDraft};
use crate::error::ParseError;
use order_types::export::decimal_number;
use order_types::LineItem;
use roxmltree::{Document, Node};

/// Parse the text of an XML order file
pub fn parse_xml(text: &str) -> Result<OrderDraft, ParseError> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();

    let order = if root.has_tag_name("Order") {
        root
    } else if root.has_tag_name("Orders") {
        root.children()
            .find(|n| n.has_tag_name("Order"))
            .ok_or(ParseError::MissingField { field: "Order" })?
    } else {
        return Err(ParseError::Structure(format!(
            "expected <Order> root element, found <{}>",
            root.tag_name().name()
        )));
    };

    let date = attribute(order, &["id", "date"]).ok_or(ParseError::MissingField { field: "id" })?;
    let placed_at = date
        .parse::<i64>()
        .map_err(|_| ParseError::invalid("id", date))?;

    let type_text = child_text(order, &["OrderType", "Type"])
        .ok_or(ParseError::MissingField { field: "OrderType" })?;
    let order_type = draft::order_type(type_text)?;

    let items = order
        .children()
        .filter(|n| n.has_tag_name("Item"))
        .map(parse_item)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OrderDraft {
        placed_at,
        order_type,
        items,
        company: None,
    })
}

fn parse_item(item: Node<'_, '_>) -> Result<LineItem, ParseError> {
    let name = attribute(item, &["type", "name"]).ok_or(ParseError::MissingField { field: "type" })?;

    let qty_text =
        child_text(item, &["Quantity"]).ok_or(ParseError::MissingField { field: "Quantity" })?;
    let quantity = qty_text
        .parse::<u64>()
        .map_err(|_| ParseError::invalid("quantity", qty_text))
        .and_then(draft::quantity)?;

    let price_text = child_text(item, &["Price"]).ok_or(ParseError::MissingField { field: "Price" })?;
    let price = decimal_number::parse(price_text)
        .map_err(|_| ParseError::invalid("price", price_text))
        .and_then(draft::price)?;

    Ok(LineItem::new(name, quantity, price))
}

fn attribute<'a>(node: Node<'a, '_>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| node.attribute(*name))
        .map(str::trim)
}

fn child_text<'a>(node: Node<'a, '_>, names: &[&str]) -> Option<&'a str> {
    node.children()
        .find(|c| names.iter().any(|name| c.has_tag_name(*name)))
        .and_then(|c| c.text())
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_types::OrderType;
    use rust_decimal_macros::dec;

    const GRILLED_CHEESE_ORDER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Orders>
  <Order id="1758038400000">
    <OrderType>pickup</OrderType>
    <Item type="Grilled Cheese">
      <Price>4.39</Price>
      <Quantity>1</Quantity>
    </Item>
    <Item type="Milkshake">
      <Price>5.09</Price>
      <Quantity>1</Quantity>
    </Item>
  </Order>
</Orders>"#;

    #[test]
    fn test_parse_valid() {
        let draft = parse_xml(GRILLED_CHEESE_ORDER).unwrap();
        assert_eq!(draft.placed_at, 1758038400000);
        assert_eq!(draft.order_type, OrderType::Pickup);
        assert_eq!(
            draft.items,
            vec![
                LineItem::new("Grilled Cheese", 1, dec!(4.39)),
                LineItem::new("Milkshake", 1, dec!(5.09)),
            ]
        );
    }

    #[test]
    fn test_bare_order_root_and_aliases() {
        let text = r#"<Order date="42"><Type>Delivery</Type>
            <Item name="Soup"><Quantity>3</Quantity><Price>2.50</Price></Item></Order>"#;
        let draft = parse_xml(text).unwrap();
        assert_eq!(draft.placed_at, 42);
        assert_eq!(draft.order_type, OrderType::Delivery);
        assert_eq!(draft.items[0], LineItem::new("Soup", 3, dec!(2.50)));
    }

    #[test]
    fn test_wrong_root() {
        let err = parse_xml("<Invoice/>").unwrap_err();
        assert!(matches!(err, ParseError::Structure(_)));
    }

    #[test]
    fn test_missing_parts() {
        let err = parse_xml(r#"<Order><OrderType>togo</OrderType></Order>"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "id" }));

        let err = parse_xml(r#"<Order id="1"/>"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "OrderType" }));

        let err = parse_xml(
            r#"<Order id="1"><OrderType>togo</OrderType><Item type="x"><Price>1</Price></Item></Order>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "Quantity" }));
    }

    #[test]
    fn test_invalid_values() {
        let err = parse_xml(
            r#"<Order id="1"><OrderType>togo</OrderType><Item type="x"><Quantity>lots</Quantity><Price>1</Price></Item></Order>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "quantity", .. }));

        let err = parse_xml(r#"<Order id="soon"><OrderType>togo</OrderType></Order>"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { field: "id", .. }));

        let err = parse_xml(r#"<Order id="1"><OrderType>catering</OrderType></Order>"#).unwrap_err();
        assert!(matches!(err, ParseError::UnknownType(_)));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(parse_xml("<Order id=\"1\">"), Err(ParseError::Xml(_))));
    }
}
