//! Ingestion pipeline
//!
//! ```text
//! DirectoryWatcher ──path──▶ blocking worker: FileParser ──▶ OrderRegistry::add_order ──▶ observers
//! ```
//!
//! The watcher only detects files. Each detected file is parsed on Tokio's
//! blocking pool so a slow or failing parse never holds up detection, which
//! also means two files detected close together may be committed in either
//! order.

use crate::builder::TrackerBuilder;
use crate::error::TrackerError;
use crate::ingest::{Ingest, IngestSnapshot, IngestStats};
use order_parser::{export_all, restore_dir, FileParser};
use order_registry::OrderRegistry;
use order_types::OrderId;
use order_watch::{DirectoryWatcher, WatchState};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{error, info, instrument, warn};

/// Watches a directory and keeps a registry of the orders found there
///
/// # Example
///
/// ```no_run
/// use order_tracker::OrderTracker;
///
/// #[tokio::main]
/// async fn main() -> Result<(), order_tracker::TrackerError> {
///     let tracker = OrderTracker::builder("incoming")
///         .with_export_dir("saved")
///         .build()?;
///
///     tracker.start().await?;
///     tokio::signal::ctrl_c().await.ok();
///     let exported = tracker.shutdown().await?;
///     println!("saved {} orders", exported.len());
///     Ok(())
/// }
/// ```
pub struct OrderTracker {
    ingest: Arc<Ingest>,
    watcher: DirectoryWatcher,
    workers: TaskTracker,
    export_dir: Option<PathBuf>,
    restore: bool,
    export_on_shutdown: bool,
    started: AtomicBool,
}

impl std::fmt::Debug for OrderTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderTracker")
            .field("watcher", &self.watcher)
            .field("orders", &self.ingest.registry.len())
            .field("stats", &self.stats())
            .field("export_dir", &self.export_dir)
            .finish()
    }
}

impl OrderTracker {
    /// Create a tracker builder
    pub fn builder(directory: impl Into<PathBuf>) -> TrackerBuilder {
        TrackerBuilder::new(directory)
    }

    pub(crate) fn from_builder(builder: TrackerBuilder) -> Result<Self, TrackerError> {
        let config = builder.to_watch_config();
        let ingest = Arc::new(Ingest {
            parser: builder.parser.unwrap_or_default(),
            registry: Arc::new(OrderRegistry::new()),
            stats: IngestStats::default(),
        });
        let workers = TaskTracker::new();

        let on_file = {
            let ingest = ingest.clone();
            let workers = workers.clone();
            move |path: &Path| {
                let ingest = ingest.clone();
                let path = path.to_path_buf();
                let name = path.display().to_string();
                // Failures are logged inside; the file stays marked as seen
                let worker = workers.spawn_blocking(move || {
                    let _ = ingest.ingest(&path);
                });
                workers.spawn(async move {
                    if let Err(e) = worker.await {
                        error!(path = %name, error = %e, "Ingest worker panicked");
                    }
                });
            }
        };
        let watcher = DirectoryWatcher::with_callback(config, on_file)?;

        Ok(Self {
            ingest,
            watcher,
            workers,
            export_dir: builder.export_dir,
            restore: builder.restore,
            export_on_shutdown: builder.export_on_shutdown,
            started: AtomicBool::new(false),
        })
    }

    /// The order registry; register observers here before calling [`start`](Self::start)
    pub fn registry(&self) -> &Arc<OrderRegistry> {
        &self.ingest.registry
    }

    /// The parser used for new files
    pub fn parser(&self) -> &FileParser {
        &self.ingest.parser
    }

    /// Ingestion counters
    pub fn stats(&self) -> IngestSnapshot {
        self.ingest.stats.snapshot()
    }

    /// Watcher lifecycle state
    pub fn watch_state(&self) -> WatchState {
        self.watcher.state()
    }

    /// Restore exported orders if configured, then start watching
    ///
    /// Returns the number of restored orders. Restored orders reach
    /// observers as additions, and the id counter is reseeded past them
    /// before the first new file is parsed. Import files that restored
    /// orders came from are not read again. Calling `start` again after a
    /// success does nothing; after a failure it retries, and orders that
    /// were already restored are not added twice.
    #[instrument(skip(self), fields(dir = %self.watcher.config().directory.display()))]
    pub async fn start(&self) -> Result<usize, TrackerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            info!("Tracker already started");
            return Ok(0);
        }

        let result = self.restore_and_watch().await;
        if let Err(ref e) = result {
            self.started.store(false, Ordering::SeqCst);
            warn!(error = %e, "Order tracker failed to start");
        }
        result
    }

    async fn restore_and_watch(&self) -> Result<usize, TrackerError> {
        let restored = match (&self.export_dir, self.restore) {
            (Some(dir), true) => self.restore_from(dir.clone()).await?,
            _ => 0,
        };

        self.watcher.start()?;
        info!(restored, "Order tracker started");
        Ok(restored)
    }

    async fn restore_from(&self, dir: PathBuf) -> Result<usize, TrackerError> {
        let ids = self.ingest.parser.allocator().clone();
        let orders = tokio::task::spawn_blocking(move || restore_dir(&dir, &ids)).await??;

        let mut added = 0;
        for order in orders {
            if let Some(source) = order.source() {
                self.watcher.seen().mark(OsStr::new(source));
            }
            if self.ingest.registry.add_order(order) {
                added += 1;
            }
        }
        self.ingest.stats.record_restored(added);
        Ok(added)
    }

    /// Parse one file and add it to the registry, outside the watcher
    ///
    /// Goes through the same path as watched files. Returns `None` if the
    /// registry already held an order with the parsed id.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn ingest_file(&self, path: impl AsRef<Path>) -> Result<Option<OrderId>, TrackerError> {
        let ingest = self.ingest.clone();
        let path = path.as_ref().to_path_buf();
        let id = self
            .workers
            .spawn_blocking(move || ingest.ingest(&path))
            .await??;
        Ok(id)
    }

    /// Stop watching, let in-flight files finish, then export if configured
    ///
    /// Returns the exported paths. If the watch loop had already died its
    /// error is returned, after the export has been attempted.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<Vec<PathBuf>, TrackerError> {
        self.watcher.stop();
        let watch_result = self.watcher.join().await;

        self.workers.close();
        self.workers.wait().await;

        let exported = match (&self.export_dir, self.export_on_shutdown) {
            (Some(dir), true) => {
                let orders = self.ingest.registry.orders();
                let dir = dir.clone();
                tokio::task::spawn_blocking(move || export_all(&orders, &dir)).await??
            }
            _ => Vec::new(),
        };

        if let Err(ref e) = watch_result {
            warn!(error = %e, "Watcher had failed before shutdown");
        }
        watch_result?;

        info!(exported = exported.len(), stats = ?self.stats(), "Order tracker shut down");
        Ok(exported)
    }
}
