//! # Order Tracker
//!
//! Drop order files into a directory and track the orders they describe.
//!
//! The pipeline ties together the workspace crates:
//!
//! - [`order_watch`] detects each new `.json` / `.xml` file once
//! - [`order_parser`] turns it into an [`OrderRecord`](order_types::OrderRecord)
//! - [`order_registry`] holds the orders, enforces their lifecycle and
//!   notifies observers
//!
//! ## Quick Start
//!
//! ```no_run
//! use order_tracker::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), TrackerError> {
//!     let tracker = OrderTracker::builder("incoming")
//!         .with_export_dir("saved")
//!         .build()?;
//!
//!     tracker.registry().add_observer(Arc::new(
//!         OrderHooks::new().on_added(|order| println!("{order}\n")),
//!     ));
//!
//!     tracker.start().await?;
//!     tokio::signal::ctrl_c().await.ok();
//!     tracker.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod error;
pub mod ingest;
pub mod prelude;
pub mod tracker;

pub use builder::{ConfigError, TrackerBuilder, MAX_DEBOUNCE};
pub use error::TrackerError;
pub use ingest::{IngestSnapshot, IngestStats};
pub use tracker::OrderTracker;

// Re-export the component crates
pub use order_parser;
pub use order_registry;
pub use order_types;
pub use order_watch;
