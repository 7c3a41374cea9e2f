//! Error types for order file parsing and the export archive

use order_types::UnknownVariant;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn an order file into an [`OrderRecord`](order_types::OrderRecord)
///
/// A parse either yields a complete record or one of these; there is no
/// partially populated result.
#[derive(Error, Debug)]
pub enum ParseError {
    /// File could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension is neither `.json` nor `.xml`
    #[error("unsupported order file: {}", path.display())]
    UnsupportedExtension { path: PathBuf },

    /// Not valid JSON
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Not well-formed XML
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Well-formed document with the wrong shape
    #[error("unexpected document structure: {0}")]
    Structure(String),

    /// Required field absent
    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    /// Field present but not a usable number
    #[error("invalid {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    /// Order type outside the closed enumeration
    #[error("{0}")]
    UnknownType(UnknownVariant),

    /// Order status outside the closed enumeration
    #[error("{0}")]
    UnknownStatus(UnknownVariant),

    /// Every order id has been handed out
    #[error("order ids exhausted")]
    IdsExhausted,
}

impl ParseError {
    /// Returns true if reading the file again might succeed
    ///
    /// Only I/O failures qualify; a malformed document stays malformed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    pub(crate) fn invalid(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidNumber {
            field,
            value: value.to_string(),
        }
    }
}

/// Failure while exporting or restoring orders
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Directory or file could not be created, read or written
    #[error("archive I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be serialized
    #[error("failed to serialize order: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        let io = ParseError::Io {
            path: PathBuf::from("a.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(io.is_retryable());
        assert!(!ParseError::MissingField { field: "items" }.is_retryable());
    }

    #[test]
    fn test_messages() {
        let err = ParseError::invalid("quantity", "two");
        assert_eq!(err.to_string(), "invalid quantity: two");
        let err = ParseError::MissingField { field: "order_date" };
        assert_eq!(err.to_string(), "missing field: order_date");
    }
}
