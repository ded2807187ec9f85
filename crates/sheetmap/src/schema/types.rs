//! Built-in value types and their converters.
//!
//! Converters accept either a value already typed by the cell decoder or,
//! defensively, a string form. Spreadsheet editors auto-convert typed input
//! (a column of numbers entered into text cells, or numbers stored as text),
//! so the string coercions are load-bearing, not a convenience. Each string
//! coercion is guarded by a round-trip stringification check so that
//! ambiguous input is rejected instead of silently reinterpreted.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use sheetmap_core::{serial_to_datetime, CellValue};

use crate::schema::value::Value;

/// Machine-readable reason codes attached to `invalid` conversion errors.
pub mod reason {
    pub const NOT_A_STRING: &str = "not_a_string";
    pub const NOT_A_NUMBER: &str = "not_a_number";
    pub const INVALID_NUMBER: &str = "invalid_number";
    pub const OUT_OF_BOUNDS: &str = "out_of_bounds";
    pub const NOT_AN_INTEGER: &str = "not_an_integer";
    pub const NOT_A_BOOLEAN: &str = "not_a_boolean";
    pub const NOT_A_DATE: &str = "not_a_date";
    pub const NOT_A_URL: &str = "not_a_url";
    pub const NOT_AN_EMAIL: &str = "not_an_email";
    pub const UNKNOWN: &str = "unknown";
}

/// A conversion failure: the error kind plus an optional finer-grained reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// `"invalid"` for built-in converters; custom parsers may use any message
    pub message: String,
    pub reason: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: None,
        }
    }

    pub fn with_reason(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: Some(reason.into()),
        }
    }

    fn invalid(reason: &'static str) -> Self {
        Self::with_reason("invalid", reason)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{} ({})", self.message, reason),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A caller-supplied converter.
///
/// Returning `Ok(None)` means "no value" without being an error; the property
/// is then treated the same as an empty cell.
pub type CustomParser =
    Arc<dyn Fn(&CellValue) -> Result<Option<Value>, ParseError> + Send + Sync>;

/// The declared type of a schema property.
#[derive(Clone)]
pub enum ValueType {
    Text,
    Number,
    /// A number required to have no fractional part
    Integer,
    Boolean,
    Date,
    Url,
    Email,
    Custom(CustomParser),
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Text => "Text",
            ValueType::Number => "Number",
            ValueType::Integer => "Integer",
            ValueType::Boolean => "Boolean",
            ValueType::Date => "Date",
            ValueType::Url => "URL",
            ValueType::Email => "Email",
            ValueType::Custom(_) => "Custom",
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueType::Custom(a), ValueType::Custom(b)) => Arc::ptr_eq(a, b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// Context threaded into converters that need workbook properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertContext {
    pub epoch1904: bool,
}

// https://stackoverflow.com/questions/8667070/javascript-regular-expression-to-validate-url
// Accepts an optional http(s)/ftp scheme, then either a non-local IPv4
// address or an alphanumeric domain with a mandatory zone, then an optional
// port and an optional path/query/fragment tail.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:(?:https?|ftp):)?//)(?:(?:[1-9]\d?|1\d\d|2[01]\d|22[0-3])(?:\.(?:1?\d{1,2}|2[0-4]\d|25[0-5])){2}(?:\.(?:[1-9]\d?|1\d\d|2[0-4]\d|25[0-4]))|(?:(?:[a-z0-9\u{00a1}-\u{ffff}][a-z0-9\u{00a1}-\u{ffff}_-]{0,62})?[a-z0-9\u{00a1}-\u{ffff}]\.)*(?:[a-z\u{00a1}-\u{ffff}]{2,}))(?::\d{2,5})?(?:[/?#]\S*)?$",
    )
    .unwrap()
});

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap());

/// Run one cell value through a declared type.
pub(crate) fn convert(
    cell: &CellValue,
    value_type: &ValueType,
    ctx: &ConvertContext,
) -> Result<Option<Value>, ParseError> {
    match value_type {
        ValueType::Text => convert_text(cell).map(Some),
        ValueType::Number => convert_number(cell).map(|n| Some(Value::Number(n))),
        ValueType::Integer => convert_integer(cell).map(Some),
        ValueType::Boolean => convert_boolean(cell).map(|b| Some(Value::Bool(b))),
        ValueType::Date => convert_date(cell, ctx).map(Some),
        ValueType::Url => convert_pattern(cell, &URL_PATTERN, reason::NOT_A_URL).map(Some),
        ValueType::Email => convert_pattern(cell, &EMAIL_PATTERN, reason::NOT_AN_EMAIL).map(Some),
        ValueType::Custom(parse) => parse(cell),
    }
}

fn convert_text(cell: &CellValue) -> Result<Value, ParseError> {
    match cell {
        CellValue::Text(s) => Ok(Value::Text(s.clone())),
        // Reverse the editor's forced string-to-number auto-conversion.
        CellValue::Number(n) => {
            check_finite(*n)?;
            Ok(Value::Text(n.to_string()))
        }
        _ => Err(ParseError::invalid(reason::NOT_A_STRING)),
    }
}

fn convert_number(cell: &CellValue) -> Result<f64, ParseError> {
    let n = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => parse_number_round_trip(s)?,
        _ => return Err(ParseError::invalid(reason::NOT_A_NUMBER)),
    };
    if n.is_nan() {
        return Err(ParseError::invalid(reason::INVALID_NUMBER));
    }
    check_finite(n)?;
    Ok(n)
}

fn convert_integer(cell: &CellValue) -> Result<Value, ParseError> {
    let n = convert_number(cell)?;
    if n.fract() != 0.0 {
        return Err(ParseError::invalid(reason::NOT_AN_INTEGER));
    }
    if n < i64::MIN as f64 || n > i64::MAX as f64 {
        return Err(ParseError::invalid(reason::OUT_OF_BOUNDS));
    }
    Ok(Value::Int(n as i64))
}

fn convert_boolean(cell: &CellValue) -> Result<bool, ParseError> {
    match cell {
        CellValue::Bool(b) => Ok(*b),
        CellValue::Text(s) => match s.as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(ParseError::invalid(reason::NOT_A_BOOLEAN)),
        },
        _ => Err(ParseError::invalid(reason::NOT_A_BOOLEAN)),
    }
}

fn convert_date(cell: &CellValue, ctx: &ConvertContext) -> Result<Value, ParseError> {
    let serial = match cell {
        CellValue::DateTime(dt) => return Ok(Value::DateTime(*dt)),
        CellValue::Number(n) => *n,
        // A date column whose cells the editor stored as text: accept a
        // clean numeric string as a day-serial.
        CellValue::Text(s) => {
            parse_number_round_trip(s).map_err(|_| ParseError::invalid(reason::NOT_A_DATE))?
        }
        _ => return Err(ParseError::invalid(reason::NOT_A_DATE)),
    };
    if serial.is_nan() {
        return Err(ParseError::invalid(reason::INVALID_NUMBER));
    }
    check_finite(serial)?;
    match serial_to_datetime(serial, ctx.epoch1904) {
        Some(dt) => Ok(Value::DateTime(dt)),
        None => Err(ParseError::invalid(reason::OUT_OF_BOUNDS)),
    }
}

fn convert_pattern(
    cell: &CellValue,
    pattern: &Regex,
    fail_reason: &'static str,
) -> Result<Value, ParseError> {
    match cell {
        CellValue::Text(s) if pattern.is_match(s) => Ok(Value::Text(s.clone())),
        _ => Err(ParseError::invalid(fail_reason)),
    }
}

/// Parse a string as a number, rejecting any string that does not stringify
/// back to itself. This keeps "1.20" or "1e3" from being silently accepted
/// as numbers the user never typed.
fn parse_number_round_trip(s: &str) -> Result<f64, ParseError> {
    let n: f64 = s
        .parse()
        .map_err(|_| ParseError::invalid(reason::NOT_A_NUMBER))?;
    if n.to_string() != s {
        return Err(ParseError::invalid(reason::NOT_A_NUMBER));
    }
    Ok(n)
}

fn check_finite(n: f64) -> Result<(), ParseError> {
    if n.is_infinite() {
        return Err(ParseError::invalid(reason::OUT_OF_BOUNDS));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn ctx() -> ConvertContext {
        ConvertContext::default()
    }

    fn invalid(code: &str) -> ParseError {
        ParseError::with_reason("invalid", code)
    }

    #[test]
    fn test_text_passthrough_and_number_reversal() {
        assert_eq!(
            convert(&CellValue::Text("abc".into()), &ValueType::Text, &ctx()),
            Ok(Some(Value::Text("abc".into())))
        );
        assert_eq!(
            convert(&CellValue::Number(123.0), &ValueType::Text, &ctx()),
            Ok(Some(Value::Text("123".into())))
        );
        assert_eq!(
            convert(&CellValue::Number(1.5), &ValueType::Text, &ctx()),
            Ok(Some(Value::Text("1.5".into())))
        );
        assert_eq!(
            convert(&CellValue::Bool(true), &ValueType::Text, &ctx()),
            Err(invalid(reason::NOT_A_STRING))
        );
    }

    #[test]
    fn test_number_accepts_round_trip_strings_only() {
        assert_eq!(
            convert(&CellValue::Text("123".into()), &ValueType::Number, &ctx()),
            Ok(Some(Value::Number(123.0)))
        );
        assert_eq!(
            convert(&CellValue::Text("1.5".into()), &ValueType::Number, &ctx()),
            Ok(Some(Value::Number(1.5)))
        );
        // "1.20" parses but stringifies back to "1.2"; ambiguous input.
        assert_eq!(
            convert(&CellValue::Text("1.20".into()), &ValueType::Number, &ctx()),
            Err(invalid(reason::NOT_A_NUMBER))
        );
        assert_eq!(
            convert(&CellValue::Text("123abc".into()), &ValueType::Number, &ctx()),
            Err(invalid(reason::NOT_A_NUMBER))
        );
        assert_eq!(
            convert(&CellValue::Number(f64::INFINITY), &ValueType::Number, &ctx()),
            Err(invalid(reason::OUT_OF_BOUNDS))
        );
    }

    #[test]
    fn test_integer() {
        assert_eq!(
            convert(&CellValue::Text("1".into()), &ValueType::Integer, &ctx()),
            Ok(Some(Value::Int(1)))
        );
        assert_eq!(
            convert(&CellValue::Number(42.0), &ValueType::Integer, &ctx()),
            Ok(Some(Value::Int(42)))
        );
        assert_eq!(
            convert(&CellValue::Text("1.2".into()), &ValueType::Integer, &ctx()),
            Err(invalid(reason::NOT_AN_INTEGER))
        );
        assert_eq!(
            convert(&CellValue::Number(1.5), &ValueType::Integer, &ctx()),
            Err(invalid(reason::NOT_AN_INTEGER))
        );
    }

    #[test]
    fn test_boolean() {
        assert_eq!(
            convert(&CellValue::Bool(true), &ValueType::Boolean, &ctx()),
            Ok(Some(Value::Bool(true)))
        );
        assert_eq!(
            convert(&CellValue::Text("1".into()), &ValueType::Boolean, &ctx()),
            Ok(Some(Value::Bool(true)))
        );
        assert_eq!(
            convert(&CellValue::Text("false".into()), &ValueType::Boolean, &ctx()),
            Ok(Some(Value::Bool(false)))
        );
        assert_eq!(
            convert(&CellValue::Text("yes".into()), &ValueType::Boolean, &ctx()),
            Err(invalid(reason::NOT_A_BOOLEAN))
        );
        assert_eq!(
            convert(&CellValue::Number(1.0), &ValueType::Boolean, &ctx()),
            Err(invalid(reason::NOT_A_BOOLEAN))
        );
    }

    #[test]
    fn test_date_from_serial_and_string() {
        let expected = NaiveDate::from_ymd_opt(2018, 3, 24)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            convert(&CellValue::Number(43183.0), &ValueType::Date, &ctx()),
            Ok(Some(Value::DateTime(expected)))
        );
        assert_eq!(
            convert(&CellValue::Text("43183".into()), &ValueType::Date, &ctx()),
            Ok(Some(Value::DateTime(expected)))
        );
        assert_eq!(
            convert(&CellValue::DateTime(expected), &ValueType::Date, &ctx()),
            Ok(Some(Value::DateTime(expected)))
        );
        assert_eq!(
            convert(&CellValue::Text("tomorrow".into()), &ValueType::Date, &ctx()),
            Err(invalid(reason::NOT_A_DATE))
        );
        assert_eq!(
            convert(&CellValue::Bool(true), &ValueType::Date, &ctx()),
            Err(invalid(reason::NOT_A_DATE))
        );
    }

    #[test]
    fn test_url() {
        for url in [
            "https://kremlin.ru",
            "http://example.com/path?query=1#hash",
            "//example.com",
            "ftp://files.example.com:2121/pub",
            "https://192.168.1.1/admin",
        ] {
            assert_eq!(
                convert(&CellValue::Text(url.into()), &ValueType::Url, &ctx()),
                Ok(Some(Value::Text(url.into()))),
                "{}",
                url
            );
        }
        for not_url in ["kremlin.ru", "not a url", "http://"] {
            assert_eq!(
                convert(&CellValue::Text(not_url.into()), &ValueType::Url, &ctx()),
                Err(invalid(reason::NOT_A_URL)),
                "{}",
                not_url
            );
        }
    }

    #[test]
    fn test_email() {
        assert_eq!(
            convert(
                &CellValue::Text("vladimir.putin@kremlin.ru".into()),
                &ValueType::Email,
                &ctx()
            ),
            Ok(Some(Value::Text("vladimir.putin@kremlin.ru".into())))
        );
        assert_eq!(
            convert(&CellValue::Text("123".into()), &ValueType::Email, &ctx()),
            Err(invalid(reason::NOT_AN_EMAIL))
        );
        assert_eq!(
            convert(&CellValue::Number(123.0), &ValueType::Email, &ctx()),
            Err(invalid(reason::NOT_AN_EMAIL))
        );
    }

    #[test]
    fn test_custom_parser() {
        let parse: CustomParser = Arc::new(|cell| match cell {
            CellValue::Text(s) if s.starts_with('(') => Ok(Some(Value::Text(s.clone()))),
            CellValue::Empty => Ok(None),
            _ => Err(ParseError::new("not a phone number")),
        });
        let value_type = ValueType::Custom(parse);

        assert_eq!(
            convert(
                &CellValue::Text("(123) 456-7890".into()),
                &value_type,
                &ctx()
            ),
            Ok(Some(Value::Text("(123) 456-7890".into())))
        );
        assert_eq!(convert(&CellValue::Empty, &value_type, &ctx()), Ok(None));
        assert_eq!(
            convert(&CellValue::Number(5.0), &value_type, &ctx()),
            Err(ParseError::new("not a phone number"))
        );
    }
}
