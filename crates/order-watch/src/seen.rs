//! Filename dedupe

use parking_lot::Mutex;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};

/// Set of file names that have already been reported
#[derive(Debug, Default)]
pub struct SeenFiles {
    names: Mutex<HashSet<OsString>>,
}

impl SeenFiles {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name`; returns true only the first time a name is marked
    pub fn mark(&self, name: &OsStr) -> bool {
        let mut names = self.names.lock();
        if names.contains(name) {
            return false;
        }
        names.insert(name.to_os_string())
    }

    /// Check if `name` was marked
    pub fn contains(&self, name: &OsStr) -> bool {
        self.names.lock().contains(name)
    }

    /// Number of names marked
    pub fn len(&self) -> usize {
        self.names.lock().len()
    }

    /// True when nothing was marked
    pub fn is_empty(&self) -> bool {
        self.names.lock().is_empty()
    }
}
