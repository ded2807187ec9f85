//! Top-level error type.

use thiserror::Error;

use crate::schema::SchemaError;
use sheetmap_xlsx::XlsxError;

/// Any fatal failure of a read call.
///
/// Value-level mapping problems are not errors at this level; they are
/// accumulated in [`MappingResult::errors`](crate::schema::MappingResult).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, Error>;
