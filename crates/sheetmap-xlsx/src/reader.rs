//! XLSX reader
//!
//! Streams the workbook parts out of the ZIP container, decodes one
//! worksheet's cells, and assembles them into a trimmed matrix.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use sheetmap_core::{CellRef, CellValue, Dimensions};

use crate::cell::{decode_cell_value, DecodeContext, RawCell};
use crate::date_format::DateFormatOptions;
use crate::error::{XlsxError, XlsxResult};
use crate::matrix::{assemble, Matrix, PlacedCell};
use crate::package::{parse_relationships, parse_workbook, WorkbookProperties};
use crate::shared_strings::parse_shared_strings;
use crate::styles::parse_styles;

/// Which sheet to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// 1-based position in workbook order
    Index(usize),
    /// Sheet display name
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(1)
    }
}

impl From<usize> for SheetSelector {
    fn from(index: usize) -> Self {
        SheetSelector::Index(index)
    }
}

impl From<&str> for SheetSelector {
    fn from(name: &str) -> Self {
        SheetSelector::Name(name.to_string())
    }
}

/// Caller-facing read configuration.
///
/// Every field has a documented default; unlike an ad hoc options bag, an
/// unknown option cannot be silently ignored.
pub struct ReadOptions {
    /// Sheet to read (default: the first sheet)
    pub sheet: SheetSelector,
    /// A format template the caller knows to be a date format
    pub date_format: Option<String>,
    /// Smart date-template detection (default on)
    pub smart_date_detection: bool,
    /// Override the workbook's date system; normally read from
    /// `xl/workbook.xml`
    pub epoch1904: Option<bool>,
    /// Trim surrounding whitespace from string values (default on)
    pub trim_strings: bool,
    /// Escape hatch for format-specific quirks: runs on the trimmed matrix
    /// before it is returned
    #[allow(clippy::type_complexity)]
    pub transform: Option<Box<dyn Fn(Vec<Vec<CellValue>>) -> Vec<Vec<CellValue>> + Send + Sync>>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::default(),
            date_format: None,
            smart_date_detection: true,
            epoch1904: None,
            trim_strings: true,
            transform: None,
        }
    }
}

/// One sheet, read and trimmed
#[derive(Debug)]
pub struct SheetData {
    /// Trimmed matrix rows
    pub rows: Vec<Vec<CellValue>>,
    /// Original 0-based row index per surviving row; translates a post-trim
    /// row number back to the row in the untrimmed sheet
    pub row_index_map: Vec<usize>,
    /// Merged cell ranges declared by the sheet
    pub merged_cells: Vec<Dimensions>,
    /// Workbook properties (date system, sheet list)
    pub properties: WorkbookProperties,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read one sheet from a file path
    pub fn read_file<P: AsRef<Path>>(path: P, options: &ReadOptions) -> XlsxResult<SheetData> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read one sheet from a reader
    pub fn read<R: Read + Seek>(reader: R, options: &ReadOptions) -> XlsxResult<SheetData> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let part_paths = {
            let file = archive
                .by_name("xl/_rels/workbook.xml.rels")
                .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;
            parse_relationships(BufReader::new(file))?
        };

        let properties = {
            let file = archive
                .by_name("xl/workbook.xml")
                .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;
            parse_workbook(BufReader::new(file))?
        };

        // Resolve the requested sheet to a worksheet part path.
        let (requested, relation_id) = match &options.sheet {
            SheetSelector::Index(index) => (
                index.to_string(),
                index
                    .checked_sub(1)
                    .and_then(|i| properties.sheets.get(i))
                    .and_then(|s| s.relation_id.clone()),
            ),
            SheetSelector::Name(name) => (
                name.clone(),
                properties
                    .sheets
                    .iter()
                    .find(|s| &s.name == name)
                    .and_then(|s| s.relation_id.clone()),
            ),
        };
        let sheet_path = relation_id
            .and_then(|rid| part_paths.sheets.get(&rid).cloned())
            .ok_or_else(|| XlsxError::SheetNotFound {
                requested,
                available: properties.sheet_names(),
            })?;

        let shared_strings = match &part_paths.shared_strings {
            Some(path) => match archive.by_name(path) {
                Ok(file) => parse_shared_strings(BufReader::new(file))?,
                // The relationship may dangle; no strings is valid.
                Err(_) => Vec::new(),
            },
            None => Vec::new(),
        };

        let styles = match &part_paths.styles {
            Some(path) => {
                let file = archive
                    .by_name(path)
                    .map_err(|_| XlsxError::MissingPart(path.clone()))?;
                parse_styles(BufReader::new(file))?
            }
            None => Vec::new(),
        };

        let decode_ctx = DecodeContext {
            shared_strings: &shared_strings,
            styles: &styles,
            epoch1904: options.epoch1904.unwrap_or(properties.epoch1904),
            date_format: DateFormatOptions {
                explicit_template: options.date_format.clone(),
                disable_smart_detection: !options.smart_date_detection,
            },
            trim_strings: options.trim_strings,
        };

        let worksheet = {
            let file = archive
                .by_name(&sheet_path)
                .map_err(|_| XlsxError::MissingPart(sheet_path.clone()))?;
            read_worksheet(BufReader::new(file), &decode_ctx)?
        };

        let dimensions = worksheet.dimensions.or_else(|| {
            Dimensions::bounding_box(worksheet.cells.iter().map(|c| &c.reference))
        });
        let matrix = match dimensions {
            Some(dimensions) => assemble(worksheet.cells, &dimensions).trim_trailing(),
            None => Matrix::default(),
        };

        let Matrix {
            rows,
            row_index_map,
        } = matrix;

        let rows = match &options.transform {
            Some(transform) => transform(rows),
            None => rows,
        };

        Ok(SheetData {
            rows,
            row_index_map,
            merged_cells: worksheet.merged_cells,
            properties,
        })
    }

    /// List the workbook's sheet names without reading any cells
    pub fn sheet_names<R: Read + Seek>(reader: R) -> XlsxResult<Vec<String>> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;
        let properties = parse_workbook(BufReader::new(file))?;
        Ok(properties.sheet_names())
    }
}

struct ParsedWorksheet {
    cells: Vec<PlacedCell>,
    dimensions: Option<Dimensions>,
    merged_cells: Vec<Dimensions>,
}

/// Stream one worksheet part, decoding each `<c>` element as it closes.
fn read_worksheet<R: std::io::BufRead>(
    reader: R,
    ctx: &DecodeContext<'_>,
) -> XlsxResult<ParsedWorksheet> {
    let mut xml_reader = Reader::from_reader(reader);
    // Cell text is captured verbatim; whitespace handling belongs to the
    // decoder's trim option, not the XML layer.
    xml_reader.trim_text(false);

    let mut buf = Vec::new();

    let mut cells: Vec<PlacedCell> = Vec::new();
    let mut dimensions: Option<Dimensions> = None;
    let mut merged_cells: Vec<Dimensions> = Vec::new();

    // Current cell state
    let mut current_ref: Option<String> = None;
    let mut current_type: Option<String> = None;
    let mut current_style: Option<u32> = None;
    let mut current_value: Option<String> = None;
    let mut current_inline: Option<String> = None;
    let mut in_cell = false;
    let mut in_value = false;
    let mut in_inline_str = false;
    let mut in_inline_text = false;

    loop {
        let event = xml_reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty_element = matches!(event, Event::Empty(_));
                match e.name().as_ref() {
                    b"dimension" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"ref" {
                                if let Ok(value) = attr.unescape_value() {
                                    // A malformed declared range is ignored in
                                    // favor of the computed bounding box.
                                    dimensions = Dimensions::parse(&value).ok();
                                }
                            }
                        }
                    }
                    b"mergeCell" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"ref" {
                                if let Ok(value) = attr.unescape_value() {
                                    if let Ok(range) = Dimensions::parse(&value) {
                                        merged_cells.push(range);
                                    }
                                }
                            }
                        }
                    }
                    b"c" => {
                        in_cell = true;
                        current_ref = None;
                        current_type = None;
                        current_style = None;
                        current_value = None;
                        current_inline = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    current_ref =
                                        attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"t" => {
                                    current_type =
                                        attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"s" => {
                                    current_style = attr
                                        .unescape_value()
                                        .ok()
                                        .and_then(|s| s.parse::<u32>().ok());
                                }
                                _ => {}
                            }
                        }

                        // Self-closing <c/> carries no value; emit it now.
                        if is_empty_element {
                            in_cell = false;
                            push_cell(
                                &mut cells,
                                current_ref.take(),
                                current_type.take(),
                                None,
                                None,
                                current_style.take(),
                                ctx,
                            )?;
                        }
                    }
                    b"v" if in_cell => {
                        in_value = true;
                    }
                    b"is" if in_cell => {
                        in_inline_str = true;
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = true;
                    }
                    _ => {}
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"c" => {
                    in_cell = false;
                    push_cell(
                        &mut cells,
                        current_ref.take(),
                        current_type.take(),
                        current_value.take(),
                        current_inline.take(),
                        current_style.take(),
                        ctx,
                    )?;
                }
                b"v" => {
                    in_value = false;
                }
                b"is" => {
                    in_inline_str = false;
                }
                b"t" if in_inline_str => {
                    in_inline_text = false;
                }
                _ => {}
            },
            Event::Text(e) => {
                if in_value {
                    if let Ok(text) = e.unescape() {
                        current_value
                            .get_or_insert_with(String::new)
                            .push_str(&text);
                    }
                } else if in_inline_text {
                    if let Ok(text) = e.unescape() {
                        current_inline
                            .get_or_insert_with(String::new)
                            .push_str(&text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ParsedWorksheet {
        cells,
        dimensions,
        merged_cells,
    })
}

fn push_cell(
    cells: &mut Vec<PlacedCell>,
    reference: Option<String>,
    type_tag: Option<String>,
    value: Option<String>,
    inline_string: Option<String>,
    style: Option<u32>,
    ctx: &DecodeContext<'_>,
) -> XlsxResult<()> {
    // A cell without an `r` attribute cannot be placed; nothing to keep.
    let reference = match reference {
        Some(r) => r,
        None => return Ok(()),
    };

    let raw = RawCell {
        reference: CellRef::parse(&reference)
            .map_err(|e| XlsxError::Parse(format!("invalid cell reference '{}': {}", reference, e)))?,
        type_tag,
        value,
        inline_string,
        style,
    };

    let value = decode_cell_value(&raw, ctx)?;
    cells.push(PlacedCell {
        reference: raw.reference,
        value,
    });
    Ok(())
}
