//! Authoritative order collection
//!
//! The registry owns every [`OrderRecord`] that has been added, enforces the
//! lifecycle table from [`Transition`], remembers the most recently cancelled
//! order for a single-step undo, and tells observers about each change exactly
//! once.
//!
//! # Locking
//!
//! All order state, including the remembered-cancel slot, sits behind one
//! mutex and every operation holds it for its whole duration. Observers are
//! notified before that lock is released, from a snapshot of the observer list
//! taken under a second short-lived lock. An observer may add or remove
//! observers, but calling any order operation from inside a notification
//! deadlocks.
//!
//! # Example
//!
//! ```
//! use order_registry::OrderRegistry;
//! use order_types::{OrderId, OrderRecord, OrderStatus, OrderType};
//!
//! let registry = OrderRegistry::new();
//! registry.add_order(OrderRecord::new(OrderId::new(1), OrderType::Pickup, 0, vec![]));
//!
//! assert!(registry.start_order(OrderId::new(1)));
//! assert!(!registry.start_order(OrderId::new(1)));
//! assert_eq!(registry.get(OrderId::new(1)).map(|o| o.status()), Some(OrderStatus::InProgress));
//! ```

use crate::observer::{same_observer, Notification, OrderObserver};
use order_types::{OrderId, OrderRecord, OrderStatus, Transition};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Order counts per status
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    /// Orders waiting to be started
    pub waiting: usize,
    /// Orders being prepared
    pub in_progress: usize,
    /// Finished orders
    pub completed: usize,
    /// Cancelled orders
    pub cancelled: usize,
}

impl StatusCounts {
    /// Total across all statuses
    pub fn total(&self) -> usize {
        self.waiting + self.in_progress + self.completed + self.cancelled
    }

    fn bump(&mut self, status: OrderStatus) {
        match status {
            OrderStatus::Waiting => self.waiting += 1,
            OrderStatus::InProgress => self.in_progress += 1,
            OrderStatus::Completed => self.completed += 1,
            OrderStatus::Cancelled => self.cancelled += 1,
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Orders in commit order
    orders: Vec<OrderRecord>,
    /// id -> position in `orders`
    index: HashMap<OrderId, usize>,
    /// Target of the next undo
    last_cancelled: Option<OrderId>,
}

impl RegistryState {
    fn position(&self, id: OrderId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    fn filtered<F>(&self, keep: F) -> Vec<OrderRecord>
    where
        F: Fn(&OrderRecord) -> bool,
    {
        self.orders.iter().filter(|o| keep(o)).cloned().collect()
    }
}

/// Thread-safe order registry
#[derive(Default)]
pub struct OrderRegistry {
    state: Mutex<RegistryState>,
    observers: Mutex<Vec<Arc<dyn OrderObserver>>>,
    observer_failures: AtomicU64,
}

impl std::fmt::Debug for OrderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderRegistry")
            .field("orders", &self.len())
            .field("observers", &self.observer_count())
            .field("observer_failures", &self.observer_failures())
            .finish()
    }
}

impl OrderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append an order and notify observers
    ///
    /// Returns `false`, without notifying, if an order with the same id is
    /// already present.
    #[instrument(skip(self, order), fields(order_id = %order.id()))]
    pub fn add_order(&self, order: OrderRecord) -> bool {
        let mut state = self.state.lock();
        let id = order.id();
        if state.index.contains_key(&id) {
            warn!("Duplicate order id, ignoring");
            return false;
        }

        let position = state.orders.len();
        state.orders.push(order);
        state.index.insert(id, position);
        debug!(count = state.orders.len(), "Order added");

        self.notify(Notification::Added, &state.orders[position]);
        true
    }

    /// waiting -> in progress
    #[instrument(skip(self))]
    pub fn start_order(&self, id: OrderId) -> bool {
        self.transition(id, Transition::Start)
    }

    /// in progress -> completed
    #[instrument(skip(self))]
    pub fn complete_order(&self, id: OrderId) -> bool {
        self.transition(id, Transition::Complete)
    }

    /// waiting or in progress -> cancelled, remembered for [`undo_last_cancel`](Self::undo_last_cancel)
    #[instrument(skip(self))]
    pub fn cancel_order(&self, id: OrderId) -> bool {
        self.transition(id, Transition::Cancel)
    }

    /// cancelled -> waiting for a specific order
    ///
    /// Clears the remembered-cancel slot if it pointed at this order.
    #[instrument(skip(self))]
    pub fn uncancel_order(&self, id: OrderId) -> bool {
        self.transition(id, Transition::Uncancel)
    }

    /// Restore the most recently cancelled order to waiting
    ///
    /// A no-op when nothing is remembered or the remembered order is no
    /// longer cancelled. Succeeds at most once per cancel.
    #[instrument(skip(self))]
    pub fn undo_last_cancel(&self) -> bool {
        let mut state = self.state.lock();
        let Some(id) = state.last_cancelled else {
            debug!("Nothing to undo");
            return false;
        };
        self.apply_locked(&mut state, id, Transition::Uncancel)
    }

    /// Remove every order and forget the remembered cancel
    ///
    /// Readers see either the full collection or an empty one. No
    /// notifications are sent.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let removed = state.orders.len();
        *state = RegistryState::default();
        debug!(removed, "Registry cleared");
    }

    fn transition(&self, id: OrderId, transition: Transition) -> bool {
        let mut state = self.state.lock();
        self.apply_locked(&mut state, id, transition)
    }

    /// Apply `transition` with the state lock held, keeping the remembered
    /// slot in step and notifying on success.
    fn apply_locked(&self, state: &mut RegistryState, id: OrderId, transition: Transition) -> bool {
        let Some(position) = state.position(id) else {
            debug!(order_id = %id, %transition, "Unknown order");
            return false;
        };

        let order = &mut state.orders[position];
        let Some(previous) = order.apply(transition) else {
            debug!(
                order_id = %id,
                %transition,
                status = %order.status(),
                "Transition not allowed, ignoring"
            );
            return false;
        };
        debug!(order_id = %id, from = %previous, to = %order.status(), "Order status changed");

        match transition {
            Transition::Cancel => state.last_cancelled = Some(id),
            Transition::Uncancel if state.last_cancelled == Some(id) => {
                state.last_cancelled = None;
            }
            _ => {}
        }

        self.notify(Notification::Changed, &state.orders[position]);
        true
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All orders in commit order
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.state.lock().orders.clone()
    }

    /// Orders whose status is completed
    pub fn completed_orders(&self) -> Vec<OrderRecord> {
        self.state
            .lock()
            .filtered(|o| o.status() == OrderStatus::Completed)
    }

    /// Orders that are not completed, cancelled ones included
    pub fn incomplete_orders(&self) -> Vec<OrderRecord> {
        self.state
            .lock()
            .filtered(|o| o.status() != OrderStatus::Completed)
    }

    /// Orders whose status is cancelled
    pub fn cancelled_orders(&self) -> Vec<OrderRecord> {
        self.state
            .lock()
            .filtered(|o| o.status() == OrderStatus::Cancelled)
    }

    /// Look up one order
    pub fn get(&self, id: OrderId) -> Option<OrderRecord> {
        let state = self.state.lock();
        state.position(id).map(|p| state.orders[p].clone())
    }

    /// Number of orders
    pub fn len(&self) -> usize {
        self.state.lock().orders.len()
    }

    /// True when no orders are held
    pub fn is_empty(&self) -> bool {
        self.state.lock().orders.is_empty()
    }

    /// The order the next undo would restore
    pub fn last_cancelled(&self) -> Option<OrderId> {
        self.state.lock().last_cancelled
    }

    /// Order counts per status, from one consistent view
    pub fn count_by_status(&self) -> StatusCounts {
        let state = self.state.lock();
        let mut counts = StatusCounts::default();
        for order in &state.orders {
            counts.bump(order.status());
        }
        counts
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Register an observer; notifications follow registration order
    pub fn add_observer(&self, observer: Arc<dyn OrderObserver>) {
        self.observers.lock().push(observer);
    }

    /// Unregister an observer by identity; returns whether it was registered
    pub fn remove_observer(&self, observer: &Arc<dyn OrderObserver>) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|o| !same_observer(o, observer));
        observers.len() != before
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Number of observer calls that panicked
    pub fn observer_failures(&self) -> u64 {
        self.observer_failures.load(Ordering::Relaxed)
    }

    fn notify(&self, notification: Notification, order: &OrderRecord) {
        let snapshot: Vec<Arc<dyn OrderObserver>> = self.observers.lock().clone();
        for observer in snapshot {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| {
                notification.deliver(observer.as_ref(), order);
            }));
            if delivered.is_err() {
                self.observer_failures.fetch_add(1, Ordering::Relaxed);
                warn!(order_id = %order.id(), %notification, "Observer panicked, continuing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::OrderHooks;
    use order_types::{LineItem, OrderType};
    use parking_lot::Mutex as PlMutex;
    use rust_decimal_macros::dec;
    use std::thread;

    fn order(id: u32) -> OrderRecord {
        OrderRecord::new(
            OrderId::new(id),
            OrderType::ToGo,
            1758027600000,
            vec![LineItem::new("Burger", 1, dec!(4.39))],
        )
    }

    fn registry_with(ids: &[u32]) -> OrderRegistry {
        let registry = OrderRegistry::new();
        for id in ids {
            assert!(registry.add_order(order(*id)));
        }
        registry
    }

    fn status(registry: &OrderRegistry, id: u32) -> Option<OrderStatus> {
        registry.get(OrderId::new(id)).map(|o| o.status())
    }

    #[test]
    fn test_start_complete_start() {
        let registry = registry_with(&[1]);
        let id = OrderId::new(1);

        assert!(registry.start_order(id));
        assert!(registry.complete_order(id));
        assert!(!registry.start_order(id));
        assert_eq!(status(&registry, 1), Some(OrderStatus::Completed));
    }

    #[test]
    fn test_completed_is_terminal() {
        let registry = registry_with(&[1]);
        let id = OrderId::new(1);
        registry.start_order(id);
        registry.complete_order(id);

        assert!(!registry.cancel_order(id));
        assert!(!registry.uncancel_order(id));
        assert!(!registry.undo_last_cancel());
        assert_eq!(status(&registry, 1), Some(OrderStatus::Completed));
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let registry = registry_with(&[1]);
        let id = OrderId::new(1);

        assert!(!registry.complete_order(id));
        assert!(!registry.uncancel_order(id));
        assert!(!registry.start_order(OrderId::new(99)));
        assert_eq!(status(&registry, 1), Some(OrderStatus::Waiting));
    }

    #[test]
    fn test_cancel_then_undo_twice() {
        let registry = registry_with(&[1]);
        let id = OrderId::new(1);

        assert!(registry.cancel_order(id));
        assert_eq!(registry.last_cancelled(), Some(id));

        assert!(registry.undo_last_cancel());
        assert_eq!(status(&registry, 1), Some(OrderStatus::Waiting));
        assert_eq!(registry.last_cancelled(), None);

        assert!(!registry.undo_last_cancel());
    }

    #[test]
    fn test_cancel_in_progress() {
        let registry = registry_with(&[1]);
        let id = OrderId::new(1);
        registry.start_order(id);

        assert!(registry.cancel_order(id));
        assert!(!registry.cancel_order(id));
        assert!(registry.undo_last_cancel());
        // Undo goes back to waiting, not to the status before the cancel
        assert_eq!(status(&registry, 1), Some(OrderStatus::Waiting));
    }

    #[test]
    fn test_undo_tracks_latest_cancel_only() {
        let registry = registry_with(&[1, 2]);
        registry.cancel_order(OrderId::new(1));
        registry.cancel_order(OrderId::new(2));

        assert!(registry.undo_last_cancel());
        assert_eq!(status(&registry, 1), Some(OrderStatus::Cancelled));
        assert_eq!(status(&registry, 2), Some(OrderStatus::Waiting));
        assert!(!registry.undo_last_cancel());
    }

    #[test]
    fn test_uncancel_clears_remembered_slot() {
        let registry = registry_with(&[1, 2]);
        registry.cancel_order(OrderId::new(1));
        registry.cancel_order(OrderId::new(2));

        // Uncancelling a different order leaves the slot alone
        assert!(registry.uncancel_order(OrderId::new(1)));
        assert_eq!(registry.last_cancelled(), Some(OrderId::new(2)));

        assert!(registry.uncancel_order(OrderId::new(2)));
        assert_eq!(registry.last_cancelled(), None);
        assert!(!registry.undo_last_cancel());
    }

    #[test]
    fn test_clear() {
        let registry = registry_with(&[1, 2, 3]);
        registry.cancel_order(OrderId::new(2));

        registry.clear();
        assert!(registry.orders().is_empty());
        assert!(registry.is_empty());
        assert!(!registry.undo_last_cancel());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let registry = registry_with(&[1]);
        let added = Arc::new(PlMutex::new(0));
        let added_clone = added.clone();
        registry.add_observer(Arc::new(OrderHooks::new().on_added(move |_| {
            *added_clone.lock() += 1;
        })));

        assert!(!registry.add_order(order(1)));
        assert_eq!(registry.len(), 1);
        assert_eq!(*added.lock(), 0);
    }

    #[test]
    fn test_filtered_views() {
        let registry = registry_with(&[1, 2, 3, 4]);
        registry.start_order(OrderId::new(2));
        registry.start_order(OrderId::new(3));
        registry.complete_order(OrderId::new(3));
        registry.cancel_order(OrderId::new(4));

        let ids = |orders: Vec<OrderRecord>| orders.iter().map(|o| o.id().get()).collect::<Vec<_>>();
        assert_eq!(ids(registry.orders()), vec![1, 2, 3, 4]);
        assert_eq!(ids(registry.completed_orders()), vec![3]);
        assert_eq!(ids(registry.incomplete_orders()), vec![1, 2, 4]);
        assert_eq!(ids(registry.cancelled_orders()), vec![4]);

        let counts = registry.count_by_status();
        assert_eq!(
            counts,
            StatusCounts {
                waiting: 1,
                in_progress: 1,
                completed: 1,
                cancelled: 1
            }
        );
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_views_are_fresh() {
        let registry = registry_with(&[1]);
        let before = registry.incomplete_orders();
        registry.start_order(OrderId::new(1));
        registry.complete_order(OrderId::new(1));

        assert_eq!(before.len(), 1);
        assert!(registry.incomplete_orders().is_empty());
    }

    #[test]
    fn test_observers_in_registration_order() {
        let registry = OrderRegistry::new();
        let log = Arc::new(PlMutex::new(Vec::new()));

        for name in ["first", "second"] {
            let log = log.clone();
            let log_changed = log.clone();
            registry.add_observer(Arc::new(
                OrderHooks::new()
                    .on_added(move |o| log.lock().push(format!("{name} added {}", o.id())))
                    .on_changed(move |o| {
                        log_changed
                            .lock()
                            .push(format!("{name} changed {} {}", o.id(), o.status()))
                    }),
            ));
        }

        registry.add_order(order(5));
        registry.start_order(OrderId::new(5));
        registry.complete_order(OrderId::new(5));
        registry.start_order(OrderId::new(5));

        assert_eq!(
            *log.lock(),
            vec![
                "first added #5",
                "second added #5",
                "first changed #5 inProgress",
                "second changed #5 inProgress",
                "first changed #5 completed",
                "second changed #5 completed",
            ]
        );
    }

    #[test]
    fn test_panicking_observer_is_isolated() {
        let registry = OrderRegistry::new();
        let seen = Arc::new(PlMutex::new(Vec::new()));
        let seen_clone = seen.clone();

        registry.add_observer(Arc::new(OrderHooks::new().on_added(|_| panic!("observer bug"))));
        registry.add_observer(Arc::new(OrderHooks::new().on_added(move |o| {
            seen_clone.lock().push(o.id());
        })));

        assert!(registry.add_order(order(1)));
        assert!(registry.add_order(order(2)));

        assert_eq!(*seen.lock(), vec![OrderId::new(1), OrderId::new(2)]);
        assert_eq!(registry.observer_failures(), 2);
        assert_eq!(registry.len(), 2);
        assert!(registry.start_order(OrderId::new(1)));
    }

    #[test]
    fn test_remove_observer() {
        let registry = OrderRegistry::new();
        let count = Arc::new(PlMutex::new(0));
        let count_clone = count.clone();
        let observer: Arc<dyn OrderObserver> = Arc::new(OrderHooks::new().on_added(move |_| {
            *count_clone.lock() += 1;
        }));

        registry.add_observer(observer.clone());
        registry.add_order(order(1));
        assert!(registry.remove_observer(&observer));
        assert!(!registry.remove_observer(&observer));
        registry.add_order(order(2));

        assert_eq!(*count.lock(), 1);
        assert_eq!(registry.observer_count(), 0);
    }

    #[test]
    fn test_observer_may_register_during_notification() {
        let registry = Arc::new(OrderRegistry::new());
        let weak = Arc::downgrade(&registry);
        registry.add_observer(Arc::new(OrderHooks::new().on_added(move |_| {
            if let Some(registry) = weak.upgrade() {
                registry.add_observer(Arc::new(OrderHooks::new()));
            }
        })));

        registry.add_order(order(1));
        assert_eq!(registry.observer_count(), 2);
    }

    #[test]
    fn test_concurrent_adds_and_transitions() {
        let registry = Arc::new(OrderRegistry::new());

        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for i in 0..50u32 {
                        let id = t * 50 + i + 1;
                        assert!(registry.add_order(order(id)));
                        registry.start_order(OrderId::new(id));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 400);
        let counts = registry.count_by_status();
        assert_eq!(counts.in_progress, 400);

        let mut ids: Vec<u32> = registry.orders().iter().map(|o| o.id().get()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400);
    }

    #[test]
    fn test_cancel_and_undo_race() {
        let registry = Arc::new(registry_with(&[1]));
        let id = OrderId::new(1);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        registry.cancel_order(id);
                        registry.undo_last_cancel();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Slot and status always move together
        let status = status(&registry, 1);
        match registry.last_cancelled() {
            Some(remembered) => {
                assert_eq!(remembered, id);
                assert_eq!(status, Some(OrderStatus::Cancelled));
            }
            None => assert_eq!(status, Some(OrderStatus::Waiting)),
        }
    }
}
