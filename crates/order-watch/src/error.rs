//! Watcher error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up or running a directory watch
#[derive(Error, Debug)]
pub enum WatchError {
    // Setup errors

    /// The directory to watch does not exist
    #[error("Watch directory does not exist: {}", path.display())]
    DirectoryMissing { path: PathBuf },

    /// The path exists but is not a directory
    #[error("Watch path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// The OS watch could not be registered or the directory could not be listed
    #[error("Failed to watch {}: {source}", path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// `start` was called outside a Tokio runtime
    #[error("Watcher must be started from within a Tokio runtime")]
    NoRuntime,

    // Runtime errors

    /// The OS watch reported a failure
    #[error("Watch failed: {0}")]
    Runtime(#[source] notify::Error),

    /// The watched directory went away
    #[error("Watch directory was removed: {}", path.display())]
    DirectoryRemoved { path: PathBuf },

    /// The event source stopped unexpectedly
    #[error("Watch event channel closed")]
    ChannelClosed,
}

impl WatchError {
    /// Check if the watcher never got going
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::DirectoryMissing { .. }
                | Self::NotADirectory { .. }
                | Self::Setup { .. }
                | Self::NoRuntime
        )
    }

    /// Check if a running watcher died
    ///
    /// Consumers may choose to build a new watcher after one of these.
    pub fn is_runtime(&self) -> bool {
        !self.is_setup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_families() {
        let missing = WatchError::DirectoryMissing {
            path: PathBuf::from("/nope"),
        };
        assert!(missing.is_setup());
        assert!(!missing.is_runtime());
        assert_eq!(missing.to_string(), "Watch directory does not exist: /nope");

        let removed = WatchError::DirectoryRemoved {
            path: PathBuf::from("/orders"),
        };
        assert!(removed.is_runtime());
        assert!(WatchError::ChannelClosed.is_runtime());
        assert!(WatchError::NoRuntime.is_setup());
    }
}
