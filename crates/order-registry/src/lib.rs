//! Order registry
//!
//! Holds every order the system knows about, moves orders through their
//! lifecycle, and broadcasts additions and status changes to observers.
//!
//! - [`OrderRegistry`]: the thread-safe order collection
//! - [`OrderObserver`]: trait for change notifications
//! - [`OrderHooks`]: observer built from closures

pub mod observer;
pub mod registry;

pub use observer::{OrderHook, OrderHooks, OrderObserver};
pub use registry::{OrderRegistry, StatusCounts};
