//! Prelude module - common imports for sheetmap users
//!
//! ```rust
//! use sheetmap::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellError,
    CellRef,
    CellValue,
    // Schema mapping types
    ConversionError,
    Dimensions,

    // Error types
    Error,
    ErrorKind,

    MapOptions,
    MappingResult,
    // Configuration
    ReadOptions,
    Record,
    Result,

    Schema,
    SchemaEntry,
    SheetSelector,

    Value,
    ValueType,
    // I/O types
    XlsxReader,
};
