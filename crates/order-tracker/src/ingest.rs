//! One file in, at most one order out

use order_parser::{FileParser, ParseError};
use order_registry::OrderRegistry;
use order_types::OrderId;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Running ingestion counters
#[derive(Debug, Default)]
pub struct IngestStats {
    files_seen: AtomicU64,
    orders_ingested: AtomicU64,
    parse_failures: AtomicU64,
    orders_restored: AtomicU64,
}

/// Point-in-time copy of [`IngestStats`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSnapshot {
    /// Files handed to the parser
    pub files_seen: u64,
    /// Orders parsed and added to the registry
    pub orders_ingested: u64,
    /// Files that failed to parse
    pub parse_failures: u64,
    /// Orders loaded from a previous export
    pub orders_restored: u64,
}

impl IngestStats {
    /// Files handed to the parser
    pub fn files_seen(&self) -> u64 {
        self.files_seen.load(Ordering::Relaxed)
    }

    /// Orders parsed and added to the registry
    pub fn orders_ingested(&self) -> u64 {
        self.orders_ingested.load(Ordering::Relaxed)
    }

    /// Files that failed to parse
    pub fn parse_failures(&self) -> u64 {
        self.parse_failures.load(Ordering::Relaxed)
    }

    /// Orders loaded from a previous export
    pub fn orders_restored(&self) -> u64 {
        self.orders_restored.load(Ordering::Relaxed)
    }

    /// Copy all counters
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            files_seen: self.files_seen(),
            orders_ingested: self.orders_ingested(),
            parse_failures: self.parse_failures(),
            orders_restored: self.orders_restored(),
        }
    }

    pub(crate) fn record_restored(&self, count: usize) {
        self.orders_restored
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Parser and registry shared by every ingestion worker
#[derive(Debug)]
pub(crate) struct Ingest {
    pub(crate) parser: FileParser,
    pub(crate) registry: Arc<OrderRegistry>,
    pub(crate) stats: IngestStats,
}

impl Ingest {
    /// Parse `path` and add the order to the registry
    ///
    /// Blocking. Returns `None` if the registry already held the parsed id.
    pub(crate) fn ingest(&self, path: &Path) -> Result<Option<OrderId>, ParseError> {
        self.stats.files_seen.fetch_add(1, Ordering::Relaxed);

        let order = match self.parser.parse_file(path) {
            Ok(order) => order,
            Err(e) => {
                self.stats.parse_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    path = %path.display(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Order file rejected"
                );
                return Err(e);
            }
        };

        let id = order.id();
        let total = order.total_price();
        if !self.registry.add_order(order) {
            return Ok(None);
        }
        self.stats.orders_ingested.fetch_add(1, Ordering::Relaxed);
        info!(order_id = %id, %total, path = %path.display(), "Order ingested");
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_parser::OrderIdAllocator;
    use order_types::OrderStatus;

    fn ingest() -> Ingest {
        Ingest {
            parser: FileParser::with_allocator(Arc::new(OrderIdAllocator::new())),
            registry: Arc::new(OrderRegistry::new()),
            stats: IngestStats::default(),
        }
    }

    #[test]
    fn test_ingest_counts() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        std::fs::write(
            &good,
            r#"{"order":{"order_date":1,"type":"pickup","items":[{"name":"Tea","quantity":2,"price":1.25}]}}"#,
        )
        .unwrap();
        let bad = dir.path().join("bad.xml");
        std::fs::write(&bad, "<Order>").unwrap();

        let ingest = ingest();
        assert_eq!(ingest.ingest(&good).unwrap(), Some(OrderId::new(1)));
        assert!(ingest.ingest(&bad).is_err());

        let order = ingest.registry.get(OrderId::new(1)).unwrap();
        assert_eq!(order.status(), OrderStatus::Waiting);
        assert_eq!(ingest.registry.len(), 1);

        assert_eq!(
            ingest.stats.snapshot(),
            IngestSnapshot {
                files_seen: 2,
                orders_ingested: 1,
                parse_failures: 1,
                orders_restored: 0,
            }
        );
    }

    #[test]
    fn test_duplicate_id_not_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, r#"{"order":{"order_date":1,"type":"togo","items":[]}}"#).unwrap();

        let ingest = ingest();
        assert!(ingest.ingest(&path).unwrap().is_some());
        ingest.parser.allocator().reset();
        assert_eq!(ingest.ingest(&path).unwrap(), None);
        assert_eq!(ingest.stats.orders_ingested(), 1);
        assert_eq!(ingest.registry.len(), 1);
    }
}
