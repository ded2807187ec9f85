//! Error types for sheetmap-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheetmap-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell reference format
    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    /// Invalid dimension reference format
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}
