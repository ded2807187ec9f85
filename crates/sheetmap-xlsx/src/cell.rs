//! Raw cell decoding
//!
//! Turns one `<c>` element (type tag + raw text + style reference) into a
//! typed [`CellValue`]. Undecodable cells are structural failures that abort
//! the whole parse, as opposed to the row-level validation errors produced
//! later by schema mapping.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use sheetmap_core::{serial_to_datetime, CellError, CellRef, CellValue};

use crate::date_format::{is_date_format, DateFormatOptions};
use crate::error::{XlsxError, XlsxResult};
use crate::styles::CellStyle;

/// One `<c>` element, as extracted by the worksheet reader. Ephemeral:
/// consumed immediately by [`decode_cell_value`].
#[derive(Debug, Clone)]
pub struct RawCell {
    /// The `r` attribute, parsed
    pub reference: CellRef,
    /// The `t` attribute; absent means numeric
    pub type_tag: Option<String>,
    /// Text of the `<v>` value node
    pub value: Option<String>,
    /// Text of the `<is><t>` inline string node
    pub inline_string: Option<String>,
    /// The `s` style attribute
    pub style: Option<u32>,
}

/// Dictionaries and options shared across all cells of one parse call
pub struct DecodeContext<'a> {
    /// Shared string table
    pub shared_strings: &'a [String],
    /// Cell styles indexed by style id
    pub styles: &'a [CellStyle],
    /// Date system of the workbook
    pub epoch1904: bool,
    /// Date-format heuristic options
    pub date_format: DateFormatOptions,
    /// Trim surrounding whitespace from string values (default on)
    pub trim_strings: bool,
}

impl DecodeContext<'_> {
    fn string_value(&self, s: &str) -> CellValue {
        let s = if self.trim_strings { s.trim() } else { s };
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

/// Parse an ISO 8601 date or date-time string
fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Decode one raw cell into a typed value.
///
/// Available cell types:
/// https://github.com/SheetJS/sheetjs/blob/19620da30be2a7d7b9801938a0b9b1fd3c4c4b00/docbits/52_datatype.md
pub fn decode_cell_value(cell: &RawCell, ctx: &DecodeContext<'_>) -> XlsxResult<CellValue> {
    // Default cell type is "n" (numeric).
    // http://www.datypic.com/sc/ooxml/t-ssml_CT_Cell.html
    let type_tag = cell.type_tag.as_deref().unwrap_or("n");

    match type_tag {
        // Formula-cached string.
        "str" => Ok(match &cell.value {
            Some(v) => ctx.string_value(v),
            None => CellValue::Empty,
        }),

        // Inline (not shared) string.
        "inlineStr" => match &cell.inline_string {
            Some(v) => Ok(ctx.string_value(v)),
            None => Err(XlsxError::Parse(format!(
                "unsupported inline string structure in cell {}",
                cell.reference
            ))),
        },

        // Shared string: the value is an index into the shared string table.
        "s" => {
            let raw = cell.value.as_deref().ok_or_else(|| {
                XlsxError::Parse(format!("shared string cell {} has no value", cell.reference))
            })?;
            let index: usize = raw.parse().map_err(|_| {
                XlsxError::Parse(format!("invalid shared string index: {}", raw))
            })?;
            let s = ctx.shared_strings.get(index).ok_or(
                XlsxError::SharedStringOutOfBounds {
                    index,
                    len: ctx.shared_strings.len(),
                },
            )?;
            Ok(ctx.string_value(s))
        }

        "b" => match cell.value.as_deref() {
            Some("1") => Ok(CellValue::Bool(true)),
            Some("0") => Ok(CellValue::Bool(false)),
            other => Err(XlsxError::Parse(format!(
                "invalid boolean cell value: {:?}",
                other
            ))),
        },

        // Stub: blank cell that is ignored by data processing utilities.
        "z" => Ok(CellValue::Empty),

        // Error: the value is a numeric code. Some writers emit the symbolic
        // name instead, so accept that too.
        "e" => {
            let raw = cell.value.as_deref().ok_or_else(|| {
                XlsxError::Parse(format!("error cell {} has no value", cell.reference))
            })?;
            if let Ok(code) = raw.parse::<u8>() {
                Ok(CellValue::Error(CellError::from_code(code)))
            } else if let Some(e) = CellError::from_str(raw) {
                Ok(CellValue::Error(e))
            } else {
                Err(XlsxError::Parse(format!("invalid error cell value: {}", raw)))
            }
        }

        // Date: a string to be parsed directly (usually ISO 8601).
        "d" => match cell.value.as_deref() {
            None => Ok(CellValue::Empty),
            Some(v) => parse_iso_datetime(v)
                .map(CellValue::DateTime)
                .ok_or_else(|| XlsxError::Parse(format!("invalid date cell value: {}", v))),
        },

        "n" => {
            let raw = match cell.value.as_deref() {
                Some(v) => v,
                None => return Ok(CellValue::Empty),
            };
            let number: f64 = raw
                .parse()
                .map_err(|_| XlsxError::Parse(format!("invalid numeric cell value: {}", raw)))?;

            // Spreadsheets prefer storing dates as numeric cells; the style's
            // number format is the only hint. Only consult it when the cell
            // actually carries a style reference.
            if let Some(style_id) = cell.style {
                let style = ctx
                    .styles
                    .get(style_id as usize)
                    .ok_or(XlsxError::StyleNotFound(style_id))?;
                if let Some(format) = &style.number_format {
                    if is_date_format(format, &ctx.date_format) {
                        return serial_to_datetime(number, ctx.epoch1904)
                            .map(CellValue::DateTime)
                            .ok_or_else(|| {
                                XlsxError::Parse(format!("day serial out of range: {}", raw))
                            });
                    }
                }
            }

            Ok(CellValue::Number(number))
        }

        other => Err(XlsxError::UnsupportedCellType(other.to_string())),
    }
}
