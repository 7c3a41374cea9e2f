//! Error types shared across the order crates

use thiserror::Error;

/// A string did not name any variant of a closed enumeration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed ("order type", "order status")
    pub kind: &'static str,
    /// The offending input, as given
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
