//! Order id allocation
//!
//! Ids come from a monotonically increasing counter that starts at 1. Ids are
//! never reused, including those of cancelled orders. The counter stops
//! rather than wrapping once `u32::MAX` is reached. The only way to move the
//! counter other than allocating is [`OrderIdAllocator::reset`] or
//! [`OrderIdAllocator::reseed`], both explicit calls.

use order_types::OrderId;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

static GLOBAL: OnceLock<Arc<OrderIdAllocator>> = OnceLock::new();

/// Thread-safe order id counter
#[derive(Debug)]
pub struct OrderIdAllocator {
    next: AtomicU32,
}

impl Default for OrderIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderIdAllocator {
    /// Create a counter whose first id is 1
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    /// The process-wide allocator shared by default parsers
    pub fn global() -> Arc<OrderIdAllocator> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(OrderIdAllocator::new())))
    }

    /// Allocate the next id, or `None` once the counter is exhausted
    pub fn next_id(&self) -> Option<OrderId> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| next.checked_add(1))
            .ok()
            .map(OrderId::new)
    }

    /// The id the next allocation will return
    pub fn peek(&self) -> OrderId {
        OrderId::new(self.next.load(Ordering::SeqCst))
    }

    /// Start over from 1
    pub fn reset(&self) {
        self.next.store(1, Ordering::SeqCst);
    }

    /// Ensure future ids are greater than `max_seen`
    ///
    /// Used after restoring exported orders. Never moves the counter backwards.
    pub fn reseed(&self, max_seen: OrderId) {
        let floor = max_seen.get().saturating_add(1);
        let previous = self.next.fetch_max(floor, Ordering::SeqCst);
        debug!(max_seen = %max_seen, next = previous.max(floor), "Order id counter reseeded");
    }
}
