//! Change observers for the order registry
//!
//! Observers are told about every order added and every status change, in
//! registration order. They are called while the registry is still inside the
//! mutating call, so an observer must not call back into the registry's order
//! operations (queries included); doing so deadlocks. Registering or removing
//! observers from inside a callback is fine.
//!
//! # Example
//!
//! ```
//! use order_registry::{OrderHooks, OrderRegistry};
//! use std::sync::Arc;
//!
//! let registry = OrderRegistry::new();
//! registry.add_observer(Arc::new(
//!     OrderHooks::new()
//!         .on_added(|order| println!("New order {}", order.id()))
//!         .on_changed(|order| println!("Order {} is now {}", order.id(), order.status())),
//! ));
//! ```

use order_types::OrderRecord;
use std::fmt;
use std::sync::Arc;

/// Receives registry change notifications
///
/// Both methods default to doing nothing. A panic inside either is caught by
/// the registry, logged, and does not stop the remaining observers.
pub trait OrderObserver: Send + Sync {
    /// An order entered the registry
    fn order_added(&self, _order: &OrderRecord) {}

    /// An order's status changed
    fn order_changed(&self, _order: &OrderRecord) {}
}

/// Callback invoked with an order
pub type OrderHook = Arc<dyn Fn(&OrderRecord) + Send + Sync>;

/// Observer assembled from closures
#[derive(Clone, Default)]
pub struct OrderHooks {
    on_added: Option<OrderHook>,
    on_changed: Option<OrderHook>,
}

impl fmt::Debug for OrderHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderHooks")
            .field("on_added", &self.on_added.as_ref().map(|_| "..."))
            .field("on_changed", &self.on_changed.as_ref().map(|_| "..."))
            .finish()
    }
}

impl OrderHooks {
    /// Create an empty hooks container
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for newly added orders
    pub fn on_added<F>(mut self, f: F) -> Self
    where
        F: Fn(&OrderRecord) + Send + Sync + 'static,
    {
        self.on_added = Some(Arc::new(f));
        self
    }

    /// Register a callback for status changes
    pub fn on_changed<F>(mut self, f: F) -> Self
    where
        F: Fn(&OrderRecord) + Send + Sync + 'static,
    {
        self.on_changed = Some(Arc::new(f));
        self
    }
}

impl OrderObserver for OrderHooks {
    fn order_added(&self, order: &OrderRecord) {
        if let Some(ref hook) = self.on_added {
            hook(order);
        }
    }

    fn order_changed(&self, order: &OrderRecord) {
        if let Some(ref hook) = self.on_changed {
            hook(order);
        }
    }
}

/// Which notification is being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Notification {
    Added,
    Changed,
}

impl Notification {
    pub(crate) fn deliver(self, observer: &dyn OrderObserver, order: &OrderRecord) {
        match self {
            Self::Added => observer.order_added(order),
            Self::Changed => observer.order_changed(order),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "order_added"),
            Self::Changed => write!(f, "order_changed"),
        }
    }
}

/// Identity comparison for observer handles
///
/// Compares data pointers only, so two handles to the same observer match
/// even if they were coerced to `dyn` in different places.
pub(crate) fn same_observer(a: &Arc<dyn OrderObserver>, b: &Arc<dyn OrderObserver>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}
