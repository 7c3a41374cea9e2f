//! Re-exports for convenience
//!
//! Import everything you need with:
//! ```
//! use order_tracker::prelude::*;
//! ```

// Pipeline
pub use crate::builder::{ConfigError, TrackerBuilder};
pub use crate::error::TrackerError;
pub use crate::ingest::IngestSnapshot;
pub use crate::tracker::OrderTracker;

// Orders
pub use order_types::{
    status_label, type_label, Decimal, LineItem, OrderId, OrderRecord, OrderStatus, OrderType,
    Transition,
};

// Parsing and archive
pub use order_parser::{FileParser, OrderFormat, OrderIdAllocator, ParseError};

// Registry
pub use order_registry::{OrderHooks, OrderObserver, OrderRegistry, StatusCounts};

// Watching
pub use order_watch::{WatchConfig, WatchError, WatchState};
