//! The recursive row-to-record mapping engine.
//!
//! One call maps a trimmed matrix (header row first) against a [`Schema`],
//! producing typed records plus an accumulated list of structured errors.
//! Value-level failures never abort the call; they append one
//! [`ConversionError`] each and mapping continues with the next property.

use std::fmt;
use std::sync::Arc;

use sheetmap_core::CellValue;

use crate::schema::array::parse_array;
use crate::schema::types::{convert, reason, ConvertContext, ParseError, ValueType};
use crate::schema::value::{Record, Value};
use crate::schema::{EntryKind, Required, Schema, SchemaEntry, SchemaError};

/// What went wrong with one mapped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Type conversion or `one_of` failure
    Invalid,
    /// A required property mapped to nothing
    Required,
    /// A custom parser or validator failed with this message
    Custom(String),
}

impl ErrorKind {
    fn from_message(message: &str) -> Self {
        match message {
            "invalid" => ErrorKind::Invalid,
            "required" => ErrorKind::Required,
            other => ErrorKind::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::Invalid => "invalid",
            ErrorKind::Required => "required",
            ErrorKind::Custom(message) => message,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accumulated value-level error.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    pub kind: ErrorKind,
    /// Finer-grained machine-readable code, e.g. `not_a_number`
    pub reason: Option<String>,
    /// 1-based row number; remapped to the original sheet row when a
    /// row-index source map is supplied
    pub row: usize,
    /// Source column title (property key for nested entries)
    pub column: String,
    /// The raw value whose conversion failed, when one exists
    pub value: Option<CellValue>,
    /// The declared type of the failing property, when it has one
    pub value_type: Option<ValueType>,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column \"{}\": {}", self.row, self.column, self.kind)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({})", reason)?;
        }
        if let Some(value) = &self.value {
            write!(f, ", value: {}", value)?;
        }
        Ok(())
    }
}

/// The output of one mapping call.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingResult {
    /// One value per data row, in order. A row whose mapped record came out
    /// empty yields the configured empty-object value, `Value::Null` by
    /// default.
    pub rows: Vec<Value>,
    pub errors: Vec<ConversionError>,
}

/// Replacement value provider for empty records, called with the discarded
/// record and the property path (`None` at the top level).
pub type EmptyObjectProvider = Arc<dyn Fn(&Record, Option<&str>) -> Option<Value> + Send + Sync>;

/// Replacement value provider for arrays whose every element mapped to null.
pub type EmptyArrayProvider = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// Predicate deciding whether to skip `required` validation for a property
/// whose source column is missing; called with the column title and the
/// finished record.
pub type SkipRequiredFn = Arc<dyn Fn(&str, &Record) -> bool + Send + Sync>;

/// Mapping configuration.
#[derive(Clone)]
pub struct MapOptions {
    /// The header is the first column instead of the first row; the data is
    /// transposed before mapping (default off)
    pub column_oriented: bool,
    /// Drop rows whose every cell is empty before mapping (default on)
    pub ignore_empty_rows: bool,
    /// Separator for array-valued cells (default `,`)
    pub array_separator: char,
    /// Date system for day-serial conversion (default 1900 epoch)
    pub epoch1904: bool,
    /// Property value when the schema names a column the data lacks.
    /// `None` (the default) omits the property from the record entirely.
    pub value_for_missing_column: Option<Value>,
    /// Property value for a present-but-empty cell. Defaults to
    /// `Some(Value::Null)`: the property is present with a null value.
    pub value_for_empty_cell: Option<Value>,
    /// Override for the empty-record replacement value (default: null)
    pub empty_object_value: Option<EmptyObjectProvider>,
    /// Override for the all-elements-null array replacement value
    /// (default: null)
    pub empty_array_value: Option<EmptyArrayProvider>,
    /// Optionally skip `required` validation for missing columns
    pub skip_required_for_missing_column: Option<SkipRequiredFn>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            column_oriented: false,
            ignore_empty_rows: true,
            array_separator: ',',
            epoch1904: false,
            value_for_missing_column: None,
            value_for_empty_cell: Some(Value::Null),
            empty_object_value: None,
            empty_array_value: None,
            skip_required_for_missing_column: None,
        }
    }
}

/// Map matrix rows onto `schema`.
///
/// The first row of `data` is the list of column titles; the rest are data
/// rows. `row_index_map` translates post-trim row positions back to original
/// sheet rows for error reporting.
pub fn map_rows(
    data: &[Vec<CellValue>],
    schema: &Schema,
    options: &MapOptions,
    row_index_map: Option<&[usize]>,
) -> Result<MappingResult, SchemaError> {
    schema.check()?;

    let mut data: Vec<Vec<CellValue>> = if options.column_oriented {
        transpose(data)
    } else {
        data.to_vec()
    };

    // The map shrinks along with the data when empty rows are dropped; work
    // on a copy so the caller's map is untouched.
    let mut row_map: Option<Vec<usize>> = row_index_map.map(|m| m.to_vec());

    if options.ignore_empty_rows {
        let mut filtered = Vec::with_capacity(data.len());
        let mut filtered_map = Vec::new();
        for (i, row) in data.into_iter().enumerate() {
            if row.iter().all(CellValue::is_empty) {
                continue;
            }
            if let Some(map) = &row_map {
                if let Some(&original) = map.get(i) {
                    filtered_map.push(original);
                }
            }
            filtered.push(row);
        }
        data = filtered;
        if row_map.is_some() {
            row_map = Some(filtered_map);
        }
    }

    if data.is_empty() {
        return Ok(MappingResult {
            rows: Vec::new(),
            errors: Vec::new(),
        });
    }

    let columns = &data[0];
    let ctx = ConvertContext {
        epoch1904: options.epoch1904,
    };

    let mut rows = Vec::with_capacity(data.len() - 1);
    let mut errors = Vec::new();

    for (index, row) in data.iter().enumerate().skip(1) {
        let record = map_row(schema, row, index, None, columns, &mut errors, options, &ctx);
        rows.push(record.unwrap_or(Value::Null));
    }

    // Translate row numbers back to original sheet positions.
    if let Some(map) = &row_map {
        for error in &mut errors {
            if let Some(&original) = map.get(error.row - 1) {
                error.row = original + 1;
            }
        }
    }

    Ok(MappingResult { rows, errors })
}

struct PendingRequired<'a> {
    key: &'a str,
    entry: &'a SchemaEntry,
    missing_column: bool,
}

/// Map one row against one schema level. Returns `None` only when the
/// empty-object provider elects to omit the value.
#[allow(clippy::too_many_arguments)]
fn map_row(
    schema: &Schema,
    row: &[CellValue],
    row_index: usize,
    path: Option<&str>,
    columns: &[CellValue],
    errors: &mut Vec<ConversionError>,
    options: &MapOptions,
    ctx: &ConvertContext,
) -> Option<Value> {
    let mut record = Record::new();
    let mut is_empty_record = true;
    let mut pending: Vec<PendingRequired<'_>> = Vec::new();

    for (key, entry) in schema.iter() {
        let property_path = match path {
            Some(p) => format!("{}.{}", p, key),
            None => format!(".{}", key),
        };

        let column_index = entry
            .column
            .as_deref()
            .and_then(|title| find_column(columns, title));
        let missing_column = entry.column.is_some() && column_index.is_none();

        let mut value: Option<Value> = None;
        let mut error: Option<ParseError> = None;
        let mut error_value: Option<CellValue> = None;
        let mut error_type: Option<ValueType> = None;

        match &entry.kind {
            EntryKind::Nested(nested) => {
                value = map_row(
                    nested,
                    row,
                    row_index,
                    Some(&property_path),
                    columns,
                    errors,
                    options,
                    ctx,
                );
            }
            EntryKind::Value(value_type) | EntryKind::Array(value_type) => {
                error_type = Some(value_type.clone());
                let cell = column_index
                    .and_then(|i| row.get(i))
                    .cloned()
                    .unwrap_or(CellValue::Empty);

                if missing_column {
                    value = options.value_for_missing_column.clone();
                } else if cell.is_empty() {
                    value = options.value_for_empty_cell.clone();
                } else if matches!(entry.kind, EntryKind::Array(_)) {
                    // A non-text cell cannot be split; treat it as a
                    // one-element array.
                    let elements: Vec<CellValue> = match &cell {
                        CellValue::Text(s) => parse_array(s, options.array_separator)
                            .into_iter()
                            .map(CellValue::Text)
                            .collect(),
                        other => vec![other.clone()],
                    };
                    let mut parsed = Vec::with_capacity(elements.len());
                    for element in &elements {
                        match parse_entry_value(element, value_type, entry, ctx) {
                            Ok(element_value) => {
                                parsed.push(element_value.unwrap_or(Value::Null))
                            }
                            // One failing element aborts the whole array
                            // with a single error.
                            Err(parse_error) => {
                                error = Some(parse_error);
                                error_value = Some(element.clone());
                                break;
                            }
                        }
                    }
                    if error.is_none() {
                        value = if parsed.iter().all(Value::is_null) {
                            empty_array_value(options, &property_path)
                        } else {
                            Some(Value::Array(parsed))
                        };
                    }
                } else {
                    match parse_entry_value(&cell, value_type, entry, ctx) {
                        Ok(parsed) => value = parsed,
                        Err(parse_error) => {
                            error = Some(parse_error);
                            error_value = Some(cell);
                        }
                    }
                }
            }
        }

        match error {
            Some(parse_error) => {
                // The property stays absent from the record.
                errors.push(ConversionError {
                    kind: ErrorKind::from_message(&parse_error.message),
                    reason: parse_error.reason,
                    row: row_index + 1,
                    column: entry.column.clone().unwrap_or_else(|| key.clone()),
                    value: error_value,
                    value_type: error_type,
                });
            }
            None => {
                let is_empty_value = value.as_ref().map_or(true, Value::is_null);
                if is_empty_value {
                    if !matches!(entry.required, Required::No) {
                        // Deferred until the whole record is built; required
                        // predicates may depend on sibling properties.
                        pending.push(PendingRequired {
                            key,
                            entry,
                            missing_column,
                        });
                    }
                } else {
                    is_empty_record = false;
                }
                if let Some(v) = value {
                    record.insert(key.clone(), v);
                }
            }
        }
    }

    // An all-empty record short-circuits before required checks run: a blank
    // row is not a row full of violations.
    if is_empty_record {
        return empty_object_value(options, &record, path);
    }

    for check in pending {
        let column_name = check.entry.column.as_deref().unwrap_or(check.key);
        let skip = check.missing_column
            && options
                .skip_required_for_missing_column
                .as_ref()
                .map_or(false, |f| f(column_name, &record));
        if skip {
            continue;
        }
        let is_required = match &check.entry.required {
            Required::No => false,
            Required::Yes => true,
            Required::If(predicate) => predicate(&record),
        };
        if is_required {
            errors.push(ConversionError {
                kind: ErrorKind::Required,
                reason: None,
                row: row_index + 1,
                column: column_name.to_string(),
                value: None,
                value_type: match &check.entry.kind {
                    EntryKind::Value(t) | EntryKind::Array(t) => Some(t.clone()),
                    EntryKind::Nested(_) => None,
                },
            });
        }
    }

    Some(Value::Object(record))
}

/// Run a cell through the entry's type, then `one_of` and `validate`.
fn parse_entry_value(
    cell: &CellValue,
    value_type: &ValueType,
    entry: &SchemaEntry,
    ctx: &ConvertContext,
) -> Result<Option<Value>, ParseError> {
    if cell.is_empty() {
        return Ok(Some(Value::Null));
    }
    let value = convert(cell, value_type, ctx)?;
    if let Some(v) = &value {
        if !v.is_null() {
            if let Some(one_of) = &entry.one_of {
                if !one_of.contains(v) {
                    return Err(ParseError::with_reason("invalid", reason::UNKNOWN));
                }
            }
            if let Some(validate) = &entry.validate {
                validate(v).map_err(ParseError::new)?;
            }
        }
    }
    Ok(value)
}

fn find_column(columns: &[CellValue], title: &str) -> Option<usize> {
    columns
        .iter()
        .position(|cell| matches!(cell, CellValue::Text(t) if t == title))
}

fn empty_object_value(options: &MapOptions, record: &Record, path: Option<&str>) -> Option<Value> {
    match &options.empty_object_value {
        Some(provider) => provider(record, path),
        None => Some(Value::Null),
    }
}

fn empty_array_value(options: &MapOptions, path: &str) -> Option<Value> {
    match &options.empty_array_value {
        Some(provider) => provider(path),
        None => Some(Value::Null),
    }
}

fn transpose(data: &[Vec<CellValue>]) -> Vec<Vec<CellValue>> {
    let width = data.first().map_or(0, Vec::len);
    (0..width)
        .map(|i| {
            data.iter()
                .map(|row| row.get(i).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaEntry;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn map(
        data: &[Vec<CellValue>],
        schema: &Schema,
        options: &MapOptions,
    ) -> MappingResult {
        map_rows(data, schema, options, None).unwrap()
    }

    #[test]
    fn test_maps_typed_row() {
        let data = vec![
            vec![text("DATE"), text("NUMBER"), text("BOOLEAN"), text("STRING")],
            vec![text("43183"), text("123"), text("1"), text("abc")],
        ];
        let schema = Schema::new()
            .entry("date", SchemaEntry::value("DATE", ValueType::Date))
            .entry("number", SchemaEntry::value("NUMBER", ValueType::Number))
            .entry("boolean", SchemaEntry::value("BOOLEAN", ValueType::Boolean))
            .entry("string", SchemaEntry::value("STRING", ValueType::Text));

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors, vec![]);

        let record = result.rows[0].as_object().unwrap();
        assert_eq!(
            record.get("date").unwrap().as_datetime().unwrap().date(),
            NaiveDate::from_ymd_opt(2018, 3, 24).unwrap()
        );
        assert_eq!(record.get("number"), Some(&Value::Number(123.0)));
        assert_eq!(record.get("boolean"), Some(&Value::Bool(true)));
        assert_eq!(record.get("string"), Some(&Value::Text("abc".into())));
    }

    #[test]
    fn test_empty_cell_maps_to_null_but_missing_column_is_omitted() {
        let data = vec![
            vec![text("PRESENT")],
            vec![CellValue::Empty, text("stray")],
        ];
        let schema = Schema::new()
            .entry("present", SchemaEntry::value("PRESENT", ValueType::Text))
            .entry("absent", SchemaEntry::value("ABSENT", ValueType::Text));

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors, vec![]);

        // The record is non-empty because of another property; pin that down
        // with a second row variant instead.
        let data = vec![
            vec![text("PRESENT"), text("OTHER")],
            vec![CellValue::Empty, text("x")],
        ];
        let schema = Schema::new()
            .entry("present", SchemaEntry::value("PRESENT", ValueType::Text))
            .entry("absent", SchemaEntry::value("ABSENT", ValueType::Text))
            .entry("other", SchemaEntry::value("OTHER", ValueType::Text));
        let result = map(&data, &schema, &MapOptions::default());
        let record = result.rows[0].as_object().unwrap();
        assert_eq!(record.get("present"), Some(&Value::Null));
        assert_eq!(record.get("absent"), None);
        assert_eq!(record.get("other"), Some(&Value::Text("x".into())));
    }

    #[test]
    fn test_invalid_number_produces_error_and_omits_property() {
        let data = vec![
            vec![text("NUMBER"), text("STRING")],
            vec![text("123abc"), text("abc")],
        ];
        let schema = Schema::new()
            .entry("number", SchemaEntry::value("NUMBER", ValueType::Number))
            .entry("string", SchemaEntry::value("STRING", ValueType::Text));

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors.len(), 1);
        let error = &result.errors[0];
        assert_eq!(error.kind, ErrorKind::Invalid);
        assert_eq!(error.reason.as_deref(), Some(reason::NOT_A_NUMBER));
        assert_eq!(error.row, 2);
        assert_eq!(error.column, "NUMBER");
        assert_eq!(error.value, Some(text("123abc")));

        let record = result.rows[0].as_object().unwrap();
        assert_eq!(record.get("number"), None);
        assert_eq!(record.get("string"), Some(&Value::Text("abc".into())));
    }

    #[test]
    fn test_empty_row_maps_to_null_without_required_errors() {
        let data = vec![
            vec![text("NUMBER")],
            vec![CellValue::Empty],
        ];
        let schema = Schema::new().entry(
            "number",
            SchemaEntry::value("NUMBER", ValueType::Number).required(),
        );

        let options = MapOptions {
            ignore_empty_rows: false,
            ..Default::default()
        };
        let result = map(&data, &schema, &options);
        assert_eq!(result.rows, vec![Value::Null]);
        assert_eq!(result.errors, vec![]);
    }

    #[test]
    fn test_required_flag() {
        let data = vec![
            vec![text("NUMBER"), text("STRING")],
            vec![CellValue::Empty, text("abc")],
        ];
        let schema = Schema::new()
            .entry(
                "number",
                SchemaEntry::value("NUMBER", ValueType::Number).required(),
            )
            .entry("string", SchemaEntry::value("STRING", ValueType::Text));

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::Required);
        assert_eq!(result.errors[0].column, "NUMBER");
        assert_eq!(result.errors[0].row, 2);
    }

    #[test]
    fn test_required_predicate_sees_finished_record() {
        let schema = Schema::new()
            .entry(
                "grade",
                SchemaEntry::value("GRADE", ValueType::Number).required_if(|record| {
                    record.get("course_title").and_then(Value::as_text) == Some("Chemistry")
                }),
            )
            .entry("course_title", SchemaEntry::value("COURSE", ValueType::Text));

        let chemistry = vec![
            vec![text("COURSE")],
            vec![text("Chemistry")],
        ];
        let result = map(&chemistry, &schema, &MapOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::Required);
        assert_eq!(result.errors[0].column, "GRADE");

        let biology = vec![
            vec![text("COURSE")],
            vec![text("Biology")],
        ];
        let result = map(&biology, &schema, &MapOptions::default());
        assert_eq!(result.errors, vec![]);
    }

    #[test]
    fn test_skip_required_for_missing_column() {
        let data = vec![
            vec![text("STRING")],
            vec![text("abc")],
        ];
        let schema = Schema::new()
            .entry(
                "number",
                SchemaEntry::value("NUMBER", ValueType::Number).required(),
            )
            .entry("string", SchemaEntry::value("STRING", ValueType::Text));

        let options = MapOptions {
            skip_required_for_missing_column: Some(Arc::new(|column, _| column == "NUMBER")),
            ..Default::default()
        };
        let result = map(&data, &schema, &options);
        assert_eq!(result.errors, vec![]);
    }

    #[test]
    fn test_one_of() {
        let data = vec![
            vec![text("STATUS")],
            vec![text("active")],
            vec![text("bogus")],
        ];
        let schema = Schema::new().entry(
            "status",
            SchemaEntry::value("STATUS", ValueType::Text)
                .one_of([Value::Text("active".into()), Value::Text("inactive".into())]),
        );

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::Invalid);
        assert_eq!(result.errors[0].reason.as_deref(), Some(reason::UNKNOWN));
        assert_eq!(result.errors[0].row, 3);
    }

    #[test]
    fn test_validate_message_becomes_error_kind() {
        let data = vec![
            vec![text("NAME")],
            vec![text("George Bush")],
        ];
        let schema = Schema::new().entry(
            "name",
            SchemaEntry::value("NAME", ValueType::Text).validate(|value| {
                if value.as_text() == Some("George Bush") {
                    Err("custom-error".to_string())
                } else {
                    Ok(())
                }
            }),
        );

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::Custom("custom-error".into()));
        assert_eq!(result.rows, vec![Value::Null]);
    }

    #[test]
    fn test_array_entry() {
        let data = vec![
            vec![text("NAMES")],
            vec![text(r#"Barack Obama, "String, with, colons", Donald Trump"#)],
        ];
        let schema = Schema::new().entry("names", SchemaEntry::array("NAMES", ValueType::Text));

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors, vec![]);
        let record = result.rows[0].as_object().unwrap();
        assert_eq!(
            record.get("names"),
            Some(&Value::Array(vec![
                Value::Text("Barack Obama".into()),
                Value::Text("String, with, colons".into()),
                Value::Text("Donald Trump".into()),
            ]))
        );
    }

    #[test]
    fn test_array_single_element_error_aborts_array() {
        let data = vec![
            vec![text("NAME"), text("NUMBERS")],
            vec![text("Ada"), text("1, x, 3")],
        ];
        let schema = Schema::new()
            .entry("name", SchemaEntry::value("NAME", ValueType::Text))
            .entry(
                "numbers",
                SchemaEntry::array("NUMBERS", ValueType::Number),
            );

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].value, Some(text("x")));
        let record = result.rows[0].as_object().unwrap();
        assert_eq!(record.get("name"), Some(&Value::Text("Ada".into())));
        // The failing array is dropped from the record wholesale.
        assert_eq!(record.get("numbers"), None);
    }

    #[test]
    fn test_row_whose_only_property_errors_yields_empty_object_value() {
        let data = vec![vec![text("NUMBERS")], vec![text("1, x, 3")]];
        let schema =
            Schema::new().entry("numbers", SchemaEntry::array("NUMBERS", ValueType::Number));

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].value, Some(text("x")));
        assert_eq!(result.rows[0], Value::Null);
    }

    #[test]
    fn test_array_on_non_text_cell_wraps_single_value() {
        let data = vec![
            vec![text("NUMBERS")],
            vec![CellValue::Number(5.0)],
        ];
        let schema = Schema::new().entry("numbers", SchemaEntry::array("NUMBERS", ValueType::Number));

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors, vec![]);
        let record = result.rows[0].as_object().unwrap();
        assert_eq!(record.get("numbers"), Some(&Value::Array(vec![Value::Number(5.0)])));
    }

    #[test]
    fn test_nested_schema() {
        let data = vec![
            vec![text("NAME"), text("CITY"), text("STREET")],
            vec![text("Alice"), text("Austin"), text("Main St")],
        ];
        let schema = Schema::new()
            .entry("name", SchemaEntry::value("NAME", ValueType::Text))
            .entry(
                "address",
                SchemaEntry::nested(
                    Schema::new()
                        .entry("city", SchemaEntry::value("CITY", ValueType::Text))
                        .entry("street", SchemaEntry::value("STREET", ValueType::Text)),
                ),
            );

        let result = map(&data, &schema, &MapOptions::default());
        assert_eq!(result.errors, vec![]);
        let record = result.rows[0].as_object().unwrap();
        let address = record.get("address").unwrap().as_object().unwrap();
        assert_eq!(address.get("city"), Some(&Value::Text("Austin".into())));
        assert_eq!(address.get("street"), Some(&Value::Text("Main St".into())));
    }

    #[test]
    fn test_nested_all_empty_yields_null_property() {
        let data = vec![
            vec![text("NAME"), text("CITY"), text("STREET")],
            vec![text("Alice"), CellValue::Empty, CellValue::Empty],
        ];
        let schema = Schema::new()
            .entry("name", SchemaEntry::value("NAME", ValueType::Text))
            .entry(
                "address",
                SchemaEntry::nested(
                    Schema::new()
                        .entry("city", SchemaEntry::value("CITY", ValueType::Text))
                        .entry("street", SchemaEntry::value("STREET", ValueType::Text)),
                ),
            );

        let result = map(&data, &schema, &MapOptions::default());
        let record = result.rows[0].as_object().unwrap();
        assert_eq!(record.get("address"), Some(&Value::Null));
    }

    #[test]
    fn test_row_index_map_rewrites_error_rows() {
        let data = vec![
            vec![text("NUMBER")],
            vec![text("123abc")],
        ];
        let schema =
            Schema::new().entry("number", SchemaEntry::value("NUMBER", ValueType::Number));

        let result = map_rows(&data, &schema, &MapOptions::default(), Some(&[2, 5])).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 6);
    }

    #[test]
    fn test_ignore_empty_rows_adjusts_row_index_map() {
        let data = vec![
            vec![text("NUMBER")],
            vec![CellValue::Empty],
            vec![text("123abc")],
        ];
        let schema =
            Schema::new().entry("number", SchemaEntry::value("NUMBER", ValueType::Number));

        // The empty row at data index 1 is dropped; the failing row then sits
        // at internal row 2 and maps through entry [7] to sheet row 8.
        let result = map_rows(&data, &schema, &MapOptions::default(), Some(&[0, 4, 7])).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 8);
    }

    #[test]
    fn test_column_oriented_data_is_transposed() {
        let data = vec![
            vec![text("NAME"), text("Alice"), text("Bob")],
            vec![text("AGE"), text("30"), text("40")],
        ];
        let schema = Schema::new()
            .entry("name", SchemaEntry::value("NAME", ValueType::Text))
            .entry("age", SchemaEntry::value("AGE", ValueType::Number));

        let options = MapOptions {
            column_oriented: true,
            ..Default::default()
        };
        let result = map(&data, &schema, &options);
        assert_eq!(result.errors, vec![]);
        assert_eq!(result.rows.len(), 2);
        let bob = result.rows[1].as_object().unwrap();
        assert_eq!(bob.get("name"), Some(&Value::Text("Bob".into())));
        assert_eq!(bob.get("age"), Some(&Value::Number(40.0)));
    }

    #[test]
    fn test_custom_empty_object_value() {
        let data = vec![
            vec![text("NUMBER")],
            vec![CellValue::Empty],
        ];
        let schema =
            Schema::new().entry("number", SchemaEntry::value("NUMBER", ValueType::Number));

        let options = MapOptions {
            ignore_empty_rows: false,
            empty_object_value: Some(Arc::new(|_, _| Some(Value::Text("EMPTY".into())))),
            ..Default::default()
        };
        let result = map(&data, &schema, &options);
        assert_eq!(result.rows, vec![Value::Text("EMPTY".into())]);
    }

    #[test]
    fn test_invalid_schema_is_rejected_up_front() {
        let schema = Schema::new().entry("x", SchemaEntry::value("", ValueType::Text));
        let result = map_rows(&[], &schema, &MapOptions::default(), None);
        assert_eq!(result, Err(SchemaError::MissingColumn("x".into())));
    }
}
