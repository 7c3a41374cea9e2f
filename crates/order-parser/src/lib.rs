//! Order file parsing for the order tracking workspace
//!
//! Turns dropped order files into canonical [`OrderRecord`]s:
//!
//! - **JSON** (FoodHub): `{"order": {"order_date", "type", "items": [...]}}`
//! - **XML** (GrubStop): `<Order id=".."><OrderType/><Item type=".."/></Order>`
//!
//! Every successful parse takes a fresh id from an [`OrderIdAllocator`].
//! Failures surface as a typed [`ParseError`]; a partially populated record is
//! never returned.
//!
//! # Example
//!
//! ```
//! use order_parser::{FileParser, OrderFormat};
//!
//! let parser = FileParser::new();
//! let order = parser
//!     .parse_str(
//!         OrderFormat::Json,
//!         r#"{"order":{"order_date":1758027600000,"type":"togo",
//!             "items":[{"name":"Burger","quantity":1,"price":4.39}]}}"#,
//!     )
//!     .unwrap();
//! assert_eq!(order.items().len(), 1);
//! ```
//!
//! [`OrderRecord`]: order_types::OrderRecord

pub mod archive;
pub mod draft;
pub mod error;
pub mod format;
pub mod ids;
pub mod json;
pub mod parser;
pub mod xml;

// Re-export main types
pub use archive::{export_all, export_order, restore_dir};
pub use draft::OrderDraft;
pub use error::{ArchiveError, ParseError};
pub use format::OrderFormat;
pub use ids::OrderIdAllocator;
pub use parser::{parse_draft, restore_str, FileParser};
