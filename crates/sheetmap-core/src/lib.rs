//! # sheetmap-core
//!
//! Core data structures for the sheetmap spreadsheet conversion library:
//! - [`CellValue`] and [`CellError`] - typed cell values
//! - [`CellRef`] and [`Dimensions`] - 1-based cell addressing
//! - [`date`] - Excel day-serial conversion

pub mod address;
pub mod date;
pub mod error;
pub mod value;

// Re-exports for convenience
pub use address::{CellRef, Dimensions};
pub use date::{datetime_to_serial, serial_to_datetime};
pub use error::{Error, Result};
pub use value::{CellError, CellValue};
