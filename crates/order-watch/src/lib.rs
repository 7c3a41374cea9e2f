//! Directory watching for order files
//!
//! [`DirectoryWatcher`] observes a single directory with the operating
//! system's native change notifications and invokes a callback once for each
//! new file name with an accepted extension, including files that were already
//! there when watching started.
//!
//! # Example
//!
//! ```no_run
//! use order_watch::{DirectoryWatcher, WatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), order_watch::WatchError> {
//!     let watcher = DirectoryWatcher::with_callback(WatchConfig::new("incoming"), |path| {
//!         println!("new order file: {}", path.display());
//!     })?;
//!     watcher.start()?;
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     watcher.stop();
//!     watcher.join().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod seen;
pub mod watcher;

pub use config::{WatchConfig, DEFAULT_DEBOUNCE, DEFAULT_EXTENSIONS};
pub use error::WatchError;
pub use seen::SeenFiles;
pub use watcher::{DirectoryWatcher, FileCallback, WatchState};
