//! Pipeline error type

use crate::builder::ConfigError;
use order_parser::{ArchiveError, ParseError};
use order_watch::WatchError;
use thiserror::Error;

/// Errors surfaced by [`OrderTracker`](crate::OrderTracker)
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Invalid builder settings
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Watch setup failed or the watch loop died
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// Export or restore failed
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// A manually ingested file could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A blocking worker panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl TrackerError {
    /// Check if the error came from the directory watch
    pub fn is_watch(&self) -> bool {
        matches!(self, Self::Watch(_))
    }
}
