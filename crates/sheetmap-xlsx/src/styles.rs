//! Style table (`xl/styles.xml`)
//!
//! Only the slice of the style table that matters for data extraction is
//! read: per-cell number formats. A cell's numeric format id (or its display
//! template) is the only signal available for heuristically detecting that a
//! numeric cell really stores a date.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::XlsxResult;

/// A number format: a numeric id plus, for custom formats, the display
/// template. Built-in formats (ids below ~164) have no `<numFmt>` element,
/// so their template is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    /// `numFmtId`
    pub id: u32,
    /// `formatCode` display template, when declared in the style table
    pub template: Option<String>,
}

/// A cell style, indexed by the cell's `s` attribute into `cellXfs`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStyle {
    /// The style's number format, if it declares one
    pub number_format: Option<NumberFormat>,
}

#[derive(Debug, Default)]
struct RawXf {
    num_fmt_id: Option<u32>,
    xf_id: Option<usize>,
}

/// Parse the style table into cell styles indexed by style id.
///
/// `cellXfs` entries may inherit from `cellStyleXfs` entries through their
/// `xfId` attribute; a format declared on the cell xf itself wins.
pub fn parse_styles<R: BufRead>(reader: R) -> XlsxResult<Vec<CellStyle>> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut number_formats: HashMap<u32, String> = HashMap::new();
    let mut base_xfs: Vec<RawXf> = Vec::new();
    let mut cell_xfs: Vec<RawXf> = Vec::new();

    let mut in_base_xfs = false;
    let mut in_cell_xfs = false;

    loop {
        let event = xml_reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"numFmt" => {
                    let mut id = None;
                    let mut template = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|s| s.parse::<u32>().ok());
                            }
                            b"formatCode" => {
                                template = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(template)) = (id, template) {
                        number_formats.insert(id, template);
                    }
                }
                b"cellStyleXfs" => {
                    in_base_xfs = !matches!(event, Event::Empty(_));
                }
                b"cellXfs" => {
                    in_cell_xfs = !matches!(event, Event::Empty(_));
                }
                b"xf" if in_base_xfs || in_cell_xfs => {
                    let mut xf = RawXf::default();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                xf.num_fmt_id = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|s| s.parse::<u32>().ok());
                            }
                            b"xfId" => {
                                xf.xf_id = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|s| s.parse::<usize>().ok());
                            }
                            _ => {}
                        }
                    }
                    if in_base_xfs {
                        base_xfs.push(xf);
                    } else {
                        cell_xfs.push(xf);
                    }
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"cellStyleXfs" => in_base_xfs = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let resolve = |xf: &RawXf| -> CellStyle {
        let own = xf.num_fmt_id.map(|id| NumberFormat {
            id,
            template: number_formats.get(&id).cloned(),
        });
        let inherited = xf
            .xf_id
            .and_then(|base| base_xfs.get(base))
            .and_then(|base| base.num_fmt_id)
            .map(|id| NumberFormat {
                id,
                template: number_formats.get(&id).cloned(),
            });
        CellStyle {
            number_format: own.or(inherited),
        }
    };

    Ok(cell_xfs.iter().map(resolve).collect())
}
