//! Declarative schema mapping: matrix rows to typed, possibly nested records.

pub mod array;
pub mod map;
pub mod types;
pub mod value;

pub use array::parse_array;
pub use map::{
    map_rows, ConversionError, EmptyArrayProvider, EmptyObjectProvider, ErrorKind, MapOptions,
    MappingResult, SkipRequiredFn,
};
pub use types::{reason, ConvertContext, CustomParser, ParseError, ValueType};
pub use value::{Record, Value};

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A schema that cannot be mapped.
///
/// Raised once at call entry, before any row is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("no column title defined for schema entry \"{0}\"")]
    MissingColumn(String),
    #[error("empty nested schema for schema entry \"{0}\"")]
    EmptyNestedSchema(String),
    #[error("schema has no entries")]
    Empty,
}

/// Whether an empty property fails validation.
#[derive(Clone, Default)]
pub enum Required {
    #[default]
    No,
    Yes,
    /// Evaluated against the finished record for the row, after every
    /// property has been mapped; the predicate may depend on sibling
    /// properties declared later in the schema.
    If(Arc<dyn Fn(&Record) -> bool + Send + Sync>),
}

impl fmt::Debug for Required {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Required::No => f.write_str("No"),
            Required::Yes => f.write_str("Yes"),
            Required::If(_) => f.write_str("If(..)"),
        }
    }
}

/// A caller-supplied validation hook; the returned message becomes the error.
pub type ValidateFn = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum EntryKind {
    Value(ValueType),
    /// The type applies element-wise to the parsed array elements
    Array(ValueType),
    Nested(Box<Schema>),
}

/// One schema property: where it comes from and how to convert it.
#[derive(Clone)]
pub struct SchemaEntry {
    pub(crate) column: Option<String>,
    pub(crate) kind: EntryKind,
    pub(crate) required: Required,
    pub(crate) one_of: Option<Vec<Value>>,
    pub(crate) validate: Option<ValidateFn>,
}

impl SchemaEntry {
    /// A single value read from the column titled `column`.
    pub fn value(column: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            column: Some(column.into()),
            kind: EntryKind::Value(value_type),
            required: Required::No,
            one_of: None,
            validate: None,
        }
    }

    /// An array of values read from one cell in the column titled `column`.
    pub fn array(column: impl Into<String>, element_type: ValueType) -> Self {
        Self {
            column: Some(column.into()),
            kind: EntryKind::Array(element_type),
            required: Required::No,
            one_of: None,
            validate: None,
        }
    }

    /// A nested record mapped from the same row through `schema`.
    pub fn nested(schema: Schema) -> Self {
        Self {
            column: None,
            kind: EntryKind::Nested(Box::new(schema)),
            required: Required::No,
            one_of: None,
            validate: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = Required::Yes;
        self
    }

    pub fn required_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.required = Required::If(Arc::new(predicate));
        self
    }

    /// Restrict the converted value to a fixed set; a value outside the set
    /// produces an `invalid` error with reason `unknown`.
    pub fn one_of(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.one_of = Some(values.into_iter().collect());
        self
    }

    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }
}

impl fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SchemaEntry");
        s.field("column", &self.column);
        match &self.kind {
            EntryKind::Value(t) => s.field("type", t),
            EntryKind::Array(t) => s.field("array_of", t),
            EntryKind::Nested(schema) => s.field("schema", schema),
        };
        s.field("required", &self.required).finish_non_exhaustive()
    }
}

/// An ordered set of schema entries keyed by output property name.
///
/// Declaration order is preserved; it determines the property order of mapped
/// records and the order of reported errors, nothing else.
#[derive(Clone, Default)]
pub struct Schema {
    entries: Vec<(String, SchemaEntry)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property. Returns `self` for chaining.
    pub fn entry(mut self, key: impl Into<String>, entry: SchemaEntry) -> Self {
        self.entries.push((key.into(), entry));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(String, SchemaEntry)> {
        self.entries.iter()
    }

    /// Check the schema's structural invariants.
    ///
    /// Every value and array entry must name a source column; every nested
    /// entry must carry a non-empty schema, recursively.
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.entries.is_empty() {
            return Err(SchemaError::Empty);
        }
        for (key, entry) in &self.entries {
            match &entry.kind {
                EntryKind::Value(_) | EntryKind::Array(_) => {
                    if entry.column.as_deref().map_or(true, str::is_empty) {
                        return Err(SchemaError::MissingColumn(key.clone()));
                    }
                }
                EntryKind::Nested(nested) => {
                    if nested.is_empty() {
                        return Err(SchemaError::EmptyNestedSchema(key.clone()));
                    }
                    nested.check()?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}
