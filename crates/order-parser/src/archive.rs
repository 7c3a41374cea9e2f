//! Export and restore of order state
//!
//! Each order is written to its own pretty-printed file named
//! `order<id>_<date>.json` in the canonical [`ExportedOrder`] format.
//! Restoring reads those files back verbatim and reseeds the id counter so
//! new orders never collide with restored ones.

use crate::error::{ArchiveError, ParseError};
use crate::ids::OrderIdAllocator;
use crate::parser::restore_str;
use order_types::{ExportedOrder, OrderRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name an order is exported under
pub fn export_file_name(order: &OrderRecord) -> String {
    format!("order{}_{}.json", order.id().get(), order.placed_at())
}

/// Write one order into `dir`, creating the directory if needed
pub fn export_order(order: &OrderRecord, dir: &Path) -> Result<PathBuf, ArchiveError> {
    ensure_dir(dir)?;
    let path = dir.join(export_file_name(order));
    let json = serde_json::to_string_pretty(&ExportedOrder::from(order))?;
    fs::write(&path, json).map_err(|source| ArchiveError::Io {
        path: path.clone(),
        source,
    })?;
    debug!(order_id = %order.id(), path = %path.display(), "Order exported");
    Ok(path)
}

/// Write every order into `dir`; returns the written paths in input order
pub fn export_all<'a, I>(orders: I, dir: &Path) -> Result<Vec<PathBuf>, ArchiveError>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let paths = orders
        .into_iter()
        .map(|order| export_order(order, dir))
        .collect::<Result<Vec<_>, _>>()?;
    info!(count = paths.len(), dir = %dir.display(), "Orders exported");
    Ok(paths)
}

/// Read every exported order in `dir`
///
/// Files are read in name order. Files that fail to parse are logged and
/// skipped. Afterwards `ids` is reseeded past the highest restored id. A
/// missing directory restores nothing.
pub fn restore_dir(dir: &Path, ids: &OrderIdAllocator) -> Result<Vec<OrderRecord>, ArchiveError> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "No export directory, nothing to restore");
        return Ok(Vec::new());
    }

    let mut paths = json_files(dir)?;
    paths.sort();

    let mut restored = Vec::with_capacity(paths.len());
    for path in paths {
        match read_exported(&path) {
            Ok(order) => restored.push(order),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable export"),
        }
    }

    if let Some(max) = restored.iter().map(OrderRecord::id).max() {
        ids.reseed(max);
    }
    info!(count = restored.len(), dir = %dir.display(), "Orders restored");
    Ok(restored)
}

fn read_exported(path: &Path) -> Result<OrderRecord, ParseError> {
    let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    restore_str(&text)
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let io_err = |source| ArchiveError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if path.is_file() && is_json {
            files.push(path);
        }
    }
    Ok(files)
}

fn ensure_dir(dir: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(dir).map_err(|source| ArchiveError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
