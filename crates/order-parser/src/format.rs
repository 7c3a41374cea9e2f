//! Order file formats

use std::fmt;
use std::path::Path;

/// Supported ingest formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderFormat {
    /// `.json` files from FoodHub
    Json,
    /// `.xml` files from GrubStop
    Xml,
}

impl OrderFormat {
    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Detect the format from a bare extension, with or without the dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// Extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Source label attached to orders read in this format
    pub fn company(&self) -> &'static str {
        match self {
            Self::Json => "FoodHub",
            Self::Xml => "GrubStop",
        }
    }
}

impl fmt::Display for OrderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Xml => write!(f, "XML"),
        }
    }
}
