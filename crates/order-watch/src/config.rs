//! Watcher configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default grace period before a newly detected file is delivered
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Extensions accepted when none are configured
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["json", "xml"];

/// What to watch and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Directory to watch (not recursive)
    pub directory: PathBuf,
    /// Accepted file extensions, without the dot, compared case-insensitively
    pub extensions: Vec<String>,
    /// Delay between detecting a new file and delivering it
    pub debounce: Duration,
}

impl WatchConfig {
    /// Watch `directory` for `.json` and `.xml` files
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Set the accepted extensions
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Set the debounce delay
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Check if a path has one of the accepted extensions
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    }
}
