//! Error types for the XLSX reader

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while reading an XLSX container.
///
/// All of these are structural: they abort the whole call. Row-level schema
/// validation errors live in the `sheetmap` crate and are accumulated, not
/// returned through here.
#[derive(Debug, Error)]
pub enum XlsxError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required part in the archive
    #[error("Missing part: {0}")]
    MissingPart(String),

    /// Invalid XLSX format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested sheet does not exist
    #[error("Sheet \"{requested}\" not found. Available sheets: {}.", .available.iter().map(|s| format!("\"{}\"", s)).collect::<Vec<_>>().join(", "))]
    SheetNotFound {
        /// Sheet name or 1-based index, as requested by the caller
        requested: String,
        /// Names of the sheets that do exist
        available: Vec<String>,
    },

    /// A cell referenced a style id that the style table does not define
    #[error("Cell style not found: {0}")]
    StyleNotFound(u32),

    /// A cell referenced a shared string index outside the table
    #[error("Shared string index {index} out of bounds (table has {len} entries)")]
    SharedStringOutOfBounds {
        /// Referenced index
        index: usize,
        /// Number of entries in the shared string table
        len: usize,
    },

    /// Unrecognized cell type tag
    #[error("Cell type not supported: {0}")]
    UnsupportedCellType(String),

    /// Core error
    #[error(transparent)]
    Core(#[from] sheetmap_core::Error),
}
