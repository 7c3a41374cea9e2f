//! Tracker Builder Pattern
//!
//! Fluent configuration for [`OrderTracker`] with validation before anything
//! touches the filesystem.
//!
//! # Example
//!
//! ```
//! use order_tracker::TrackerBuilder;
//! use std::time::Duration;
//!
//! let builder = TrackerBuilder::new("incoming")
//!     .with_debounce(Duration::from_millis(250))
//!     .with_extensions(["json"])
//!     .with_export_dir("saved");
//! assert!(builder.validate().is_ok());
//! ```

use crate::error::TrackerError;
use crate::tracker::OrderTracker;
use order_parser::{FileParser, OrderFormat};
use order_watch::{WatchConfig, DEFAULT_DEBOUNCE, DEFAULT_EXTENSIONS};
use std::path::PathBuf;
use std::time::Duration;

/// Longest debounce the builder accepts
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(10);

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No import directory given
    #[error("an import directory must be specified")]
    MissingDirectory,

    /// Debounce longer than [`MAX_DEBOUNCE`]
    #[error("debounce of {debounce:?} exceeds the maximum of {max:?}")]
    DebounceTooLong { debounce: Duration, max: Duration },

    /// Extension list is empty
    #[error("at least one file extension must be accepted")]
    NoExtensions,

    /// Extension with no parser behind it
    #[error("unsupported file extension: {extension} (supported: json, xml)")]
    InvalidExtension { extension: String },
}

/// Builder for an [`OrderTracker`]
///
/// Restore and export both need an export directory; without one they are
/// skipped.
#[derive(Debug, Clone)]
pub struct TrackerBuilder {
    /// Directory watched for new order files
    pub directory: PathBuf,

    /// Accepted file extensions
    pub extensions: Vec<String>,

    /// Grace period before a new file is parsed
    pub debounce: Duration,

    /// Where orders are exported to and restored from
    pub export_dir: Option<PathBuf>,

    /// Load previously exported orders on start
    pub restore: bool,

    /// Export every order on shutdown
    pub export_on_shutdown: bool,

    /// Parser to use; the process-wide one when unset
    pub parser: Option<FileParser>,
}

impl TrackerBuilder {
    /// Start configuring a tracker for `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            debounce: DEFAULT_DEBOUNCE,
            export_dir: None,
            restore: true,
            export_on_shutdown: true,
            parser: None,
        }
    }

    /// Set the debounce delay
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the accepted file extensions
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the export directory
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// Enable or disable restoring exported orders on start
    pub fn with_restore(mut self, enabled: bool) -> Self {
        self.restore = enabled;
        self
    }

    /// Enable or disable exporting on shutdown
    pub fn with_export_on_shutdown(mut self, enabled: bool) -> Self {
        self.export_on_shutdown = enabled;
        self
    }

    /// Use a specific parser, e.g. one with its own id allocator
    pub fn with_parser(mut self, parser: FileParser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::MissingDirectory);
        }

        if self.extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }

        for extension in &self.extensions {
            let bare = extension.trim_start_matches('.');
            if OrderFormat::from_extension(bare).is_none() {
                return Err(ConfigError::InvalidExtension {
                    extension: extension.clone(),
                });
            }
        }

        if self.debounce > MAX_DEBOUNCE {
            return Err(ConfigError::DebounceTooLong {
                debounce: self.debounce,
                max: MAX_DEBOUNCE,
            });
        }

        Ok(())
    }

    /// Watcher settings derived from this builder
    pub fn to_watch_config(&self) -> WatchConfig {
        WatchConfig::new(&self.directory)
            .with_extensions(self.extensions.iter().cloned())
            .with_debounce(self.debounce)
    }

    /// Validate and create the tracker
    ///
    /// Fails if the import directory does not exist.
    pub fn build(self) -> Result<OrderTracker, TrackerError> {
        self.validate()?;
        OrderTracker::from_builder(self)
    }
}
