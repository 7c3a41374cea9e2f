//! File-to-record conversion

use crate::draft::{self, OrderDraft};
use crate::error::ParseError;
use crate::format::OrderFormat;
use crate::ids::OrderIdAllocator;
use crate::{json, xml};
use order_types::{ExportedOrder, OrderRecord, OrderStatus};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Converts order files into [`OrderRecord`]s
///
/// Every successful parse takes a fresh id from the parser's allocator, which
/// by default is the process-wide [`OrderIdAllocator::global`].
#[derive(Debug, Clone)]
pub struct FileParser {
    ids: Arc<OrderIdAllocator>,
}

impl Default for FileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FileParser {
    /// Parser backed by the process-wide id counter
    pub fn new() -> Self {
        Self::with_allocator(OrderIdAllocator::global())
    }

    /// Parser backed by its own id counter
    pub fn with_allocator(ids: Arc<OrderIdAllocator>) -> Self {
        Self { ids }
    }

    /// The id counter this parser allocates from
    pub fn allocator(&self) -> &Arc<OrderIdAllocator> {
        &self.ids
    }

    /// Parse an order file, choosing the format from its extension
    ///
    /// The record remembers the file name as its [`source`](OrderRecord::source).
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn parse_file(&self, path: &Path) -> Result<OrderRecord, ParseError> {
        let format = OrderFormat::from_path(path).ok_or_else(|| ParseError::UnsupportedExtension {
            path: path.to_path_buf(),
        })?;
        let text = read(path)?;
        let mut record = self.parse_str(format, &text)?;
        record.set_source(path.file_name().map(|name| name.to_string_lossy().into_owned()));
        debug!(order_id = %record.id(), %format, "Order file parsed");
        Ok(record)
    }

    /// Parse order text in a known format
    ///
    /// The record is tagged with the format's source label unless the
    /// document names its own.
    pub fn parse_str(&self, format: OrderFormat, text: &str) -> Result<OrderRecord, ParseError> {
        let mut draft = parse_draft(format, text)?;
        if draft.company.is_none() {
            draft.company = Some(format.company().to_string());
        }
        let id = self.ids.next_id().ok_or(ParseError::IdsExhausted)?;
        Ok(draft.into_record(id))
    }

    /// Rebuild a previously exported order exactly as it was saved
    ///
    /// No id is allocated and the stored total is kept. Callers restoring a
    /// batch should [`reseed`](OrderIdAllocator::reseed) the allocator afterwards.
    pub fn restore_file(&self, path: &Path) -> Result<OrderRecord, ParseError> {
        let text = read(path)?;
        restore_str(&text)
    }
}

/// Parse order text without assigning an id
///
/// The draft's total is checked here, so a draft returned from this function
/// always converts into a record.
pub fn parse_draft(format: OrderFormat, text: &str) -> Result<OrderDraft, ParseError> {
    let draft = match format {
        OrderFormat::Json => json::parse_json(text)?,
        OrderFormat::Xml => xml::parse_xml(text)?,
    };
    draft.total()?;
    Ok(draft)
}

/// Rebuild an order from the canonical export JSON
pub fn restore_str(text: &str) -> Result<OrderRecord, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    if let Some(status) = value.get("status").and_then(Value::as_str) {
        status
            .parse::<OrderStatus>()
            .map_err(ParseError::UnknownStatus)?;
    }
    if let Some(order_type) = value.get("type").and_then(Value::as_str) {
        draft::order_type(order_type)?;
    }
    let exported: ExportedOrder = serde_json::from_value(value)?;
    Ok(exported.into_record())
}

fn read(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}
