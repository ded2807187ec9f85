//! # sheetmap
//!
//! Read XLSX spreadsheets into a plain row/column matrix or, through a
//! declarative schema, into validated, typed, possibly nested records.
//!
//! ## Reading a matrix
//!
//! ```rust,no_run
//! use sheetmap::prelude::*;
//!
//! let rows = sheetmap::read_file("people.xlsx", &ReadOptions::default())?;
//! for row in &rows {
//!     println!("{:?}", row);
//! }
//! # Ok::<(), sheetmap::Error>(())
//! ```
//!
//! ## Reading schema-mapped records
//!
//! ```rust,no_run
//! use sheetmap::prelude::*;
//!
//! let schema = Schema::new()
//!     .entry("name", SchemaEntry::value("NAME", ValueType::Text).required())
//!     .entry("date_of_birth", SchemaEntry::value("DATE OF BIRTH", ValueType::Date))
//!     .entry("email", SchemaEntry::value("EMAIL", ValueType::Email));
//!
//! let result = sheetmap::read_file_with_schema(
//!     "people.xlsx",
//!     &schema,
//!     &ReadOptions::default(),
//!     &MapOptions::default(),
//! )?;
//! for error in &result.errors {
//!     eprintln!("{}", error);
//! }
//! # Ok::<(), sheetmap::Error>(())
//! ```

pub mod prelude;
pub mod schema;

mod error;

pub use error::{Error, Result};

// Re-export core types
pub use sheetmap_core::{
    datetime_to_serial, serial_to_datetime, CellError, CellRef, CellValue, Dimensions,
};

// Re-export I/O types
pub use sheetmap_xlsx::{ReadOptions, SheetData, SheetSelector, XlsxError, XlsxReader};

pub use schema::{
    map_rows, ConversionError, ErrorKind, MapOptions, MappingResult, Record, Schema, SchemaEntry,
    SchemaError, Value, ValueType,
};

use std::io::{Read, Seek};
use std::path::Path;

/// Read one sheet as a trimmed matrix of typed cell values.
pub fn read<R: Read + Seek>(reader: R, options: &ReadOptions) -> Result<Vec<Vec<CellValue>>> {
    Ok(XlsxReader::read(reader, options)?.rows)
}

/// Read one sheet from a file as a trimmed matrix of typed cell values.
pub fn read_file<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Vec<Vec<CellValue>>> {
    Ok(XlsxReader::read_file(path, options)?.rows)
}

/// List the workbook's sheet names without reading any cells.
pub fn read_sheet_names<R: Read + Seek>(reader: R) -> Result<Vec<String>> {
    Ok(XlsxReader::sheet_names(reader)?)
}

/// Read one sheet and map its rows onto `schema`.
///
/// The first sheet row is taken as the list of column titles. The workbook's
/// date system is used for day-serial conversion unless overridden through
/// [`ReadOptions::epoch1904`].
pub fn read_with_schema<R: Read + Seek>(
    reader: R,
    schema: &Schema,
    read_options: &ReadOptions,
    map_options: &MapOptions,
) -> Result<MappingResult> {
    let data = XlsxReader::read(reader, read_options)?;
    map_sheet(&data, schema, read_options, map_options)
}

/// Read one sheet from a file and map its rows onto `schema`.
pub fn read_file_with_schema<P: AsRef<Path>>(
    path: P,
    schema: &Schema,
    read_options: &ReadOptions,
    map_options: &MapOptions,
) -> Result<MappingResult> {
    let data = XlsxReader::read_file(path, read_options)?;
    map_sheet(&data, schema, read_options, map_options)
}

fn map_sheet(
    data: &SheetData,
    schema: &Schema,
    read_options: &ReadOptions,
    map_options: &MapOptions,
) -> Result<MappingResult> {
    let mut map_options = map_options.clone();
    map_options.epoch1904 = read_options
        .epoch1904
        .unwrap_or(data.properties.epoch1904);
    let result = schema::map_rows(&data.rows, schema, &map_options, Some(&data.row_index_map))?;
    Ok(result)
}
