//! Shared fixtures for pipeline tests

#![allow(dead_code)]

use order_parser::{FileParser, OrderIdAllocator};
use order_registry::OrderObserver;
use order_tracker::{OrderTracker, TrackerBuilder};
use order_types::OrderRecord;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// FoodHub order: Burger 1 @ 4.39, Fries 2 @ 3.09
pub const BURGER_JSON: &str = r#"{
    "order": {
        "order_date": 1758027600000,
        "type": "togo",
        "items": [
            {"name": "Burger", "quantity": 1, "price": 4.39},
            {"name": "Fries", "quantity": 2, "price": 3.09}
        ]
    }
}"#;

/// GrubStop order: Grilled Cheese 1 @ 4.39, Milkshake 1 @ 5.09
pub const GRILLED_CHEESE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
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

/// Delivery order with a single item
pub const SOUP_JSON: &str = r#"{"order":{"order_date":1758040000000,"type":"delivery",
    "items":[{"name":"Soup","quantity":3,"price":2.50}]}}"#;

/// Well-formed, but the line total does not fit in a decimal
pub const OVERFLOW_JSON: &str = r#"{"order":{"order_date":1,"type":"togo",
    "items":[{"name":"Gold","quantity":4294967295,"price":1e28}]}}"#;

/// Missing `order_date`
pub const BROKEN_JSON: &str = r#"{"order":{"type":"togo","items":[]}}"#;

/// Builder with a private id counter and a short debounce
pub fn builder(dir: &Path) -> TrackerBuilder {
    OrderTracker::builder(dir)
        .with_debounce(Duration::from_millis(20))
        .with_parser(FileParser::with_allocator(Arc::new(OrderIdAllocator::new())))
}

/// Poll until `done` holds, panicking after five seconds
pub async fn wait_until<F: Fn() -> bool>(done: F) {
    timeout(Duration::from_secs(5), async {
        while !done() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met within 5s");
}

/// Observer that records each notification as a short string
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl OrderObserver for Recorder {
    fn order_added(&self, order: &OrderRecord) {
        let source = order.company().unwrap_or("?");
        self.events.lock().unwrap().push(format!("added {source}"));
    }

    fn order_changed(&self, order: &OrderRecord) {
        self.events
            .lock()
            .unwrap()
            .push(format!("changed {}", order.status()));
    }
}
