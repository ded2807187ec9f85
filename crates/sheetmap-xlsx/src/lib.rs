//! # sheetmap-xlsx
//!
//! XLSX (Office Open XML) reader for sheetmap.

pub mod error;
pub mod reader;

mod cell;
mod date_format;
mod matrix;
mod package;
mod shared_strings;
mod styles;

pub use date_format::DateFormatOptions;
pub use error::{XlsxError, XlsxResult};
pub use package::{SheetInfo, WorkbookProperties};
pub use reader::{ReadOptions, SheetData, SheetSelector, XlsxReader};
