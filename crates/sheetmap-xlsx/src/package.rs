//! Workbook-level package parts: relationships and workbook properties

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::XlsxResult;

const REL_TYPE_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_TYPE_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
const REL_TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// Archive-internal paths of the workbook's parts, resolved from
/// `xl/_rels/workbook.xml.rels`.
///
/// Sheet file names are not reliably `sheet<N>.xml`; the relationship index
/// is the one authoritative mapping from a sheet's rId to its file.
#[derive(Debug, Default)]
pub struct PartPaths {
    /// Worksheet part path by relationship id
    pub sheets: HashMap<String, String>,
    /// Shared string table path, if the workbook has one
    pub shared_strings: Option<String>,
    /// Style table path, if the workbook has one
    pub styles: Option<String>,
}

/// Normalize a relationship target into an archive path.
///
/// Targets are normally relative to `xl/` ("worksheets/sheet1.xml"), but some
/// writers emit absolute paths ("/xl/worksheets/sheet1.xml").
fn resolve_part_path(target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else {
        format!("xl/{}", target)
    }
}

/// Parse `xl/_rels/workbook.xml.rels`
pub fn parse_relationships<R: BufRead>(reader: R) -> XlsxResult<PartPaths> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut paths = PartPaths::default();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut rel_type = None;

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => {
                            id = attr.unescape_value().ok().map(|s| s.to_string());
                        }
                        b"Target" => {
                            target = attr.unescape_value().ok().map(|s| s.to_string());
                        }
                        b"Type" => {
                            rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                        }
                        _ => {}
                    }
                }

                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                    let path = resolve_part_path(&target);
                    match rel_type.as_str() {
                        REL_TYPE_WORKSHEET => {
                            paths.sheets.insert(id, path);
                        }
                        REL_TYPE_SHARED_STRINGS => {
                            paths.shared_strings = Some(path);
                        }
                        REL_TYPE_STYLES => {
                            paths.styles = Some(path);
                        }
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paths)
}

/// A sheet entry from the workbook descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    /// `sheetId` attribute
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Relationship id pointing into [`PartPaths::sheets`]
    pub relation_id: Option<String>,
}

/// Workbook properties from `xl/workbook.xml`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookProperties {
    /// Date system: false = 1900 (Windows), true = 1904 (Mac)
    pub epoch1904: bool,
    /// Sheets in workbook order
    pub sheets: Vec<SheetInfo>,
}

impl WorkbookProperties {
    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}

/// Parse `xl/workbook.xml`
pub fn parse_workbook<R: BufRead>(reader: R) -> XlsxResult<WorkbookProperties> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut properties = WorkbookProperties::default();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) => match e.name().as_ref() {
                b"workbookPr" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"date1904" {
                            let value = attr.unescape_value().ok();
                            properties.epoch1904 = value
                                .map(|v| v.as_ref() == "1" || v.as_ref() == "true")
                                .unwrap_or(false);
                        }
                    }
                }
                b"sheet" => {
                    let mut id = None;
                    let mut name = None;
                    let mut relation_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"sheetId" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                relation_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    // A sheet without a name is not addressable; skip it.
                    if let Some(name) = name {
                        properties.sheets.push(SheetInfo {
                            id,
                            name,
                            relation_id,
                        });
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<?xml version="1.0"?>
            <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
              <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
              <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
              <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
            </Relationships>"#;

        let paths = parse_relationships(xml.as_bytes()).unwrap();
        assert_eq!(
            paths.sheets.get("rId1").map(String::as_str),
            Some("xl/worksheets/sheet1.xml")
        );
        assert_eq!(paths.styles.as_deref(), Some("xl/styles.xml"));
        assert_eq!(paths.shared_strings.as_deref(), Some("xl/sharedStrings.xml"));
    }

    #[test]
    fn test_absolute_target_path() {
        // Some writers emit absolute targets; other readers accept them, so
        // this one does too.
        let xml = r#"<Relationships>
              <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet1.xml"/>
            </Relationships>"#;

        let paths = parse_relationships(xml.as_bytes()).unwrap();
        assert_eq!(
            paths.sheets.get("rId1").map(String::as_str),
            Some("xl/worksheets/sheet1.xml")
        );
    }

    #[test]
    fn test_parse_workbook() {
        let xml = r#"<workbook>
              <workbookPr date1904="1"/>
              <sheets>
                <sheet name="Sheet1" sheetId="1" r:id="rId1"/>
                <sheet name="Data" sheetId="2" r:id="rId2"/>
              </sheets>
            </workbook>"#;

        let properties = parse_workbook(xml.as_bytes()).unwrap();
        assert!(properties.epoch1904);
        assert_eq!(properties.sheet_names(), vec!["Sheet1", "Data"]);
        assert_eq!(properties.sheets[1].relation_id.as_deref(), Some("rId2"));
    }

    #[test]
    fn test_parse_workbook_default_epoch() {
        let xml = r#"<workbook><sheets><sheet name="S" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
        let properties = parse_workbook(xml.as_bytes()).unwrap();
        assert!(!properties.epoch1904);
    }
}
