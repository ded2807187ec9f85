//! Shared fixture builder: assembles a minimal XLSX archive in memory.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

/// Build an XLSX archive from raw part contents.
pub fn build_archive(parts: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (path, content) in parts {
        writer.start_file(*path, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap()
}

/// Build a one-sheet workbook around the given worksheet XML.
pub fn build_workbook(sheet_xml: &str) -> Cursor<Vec<u8>> {
    build_workbook_with(sheet_xml, None, None)
}

/// Build a one-sheet workbook with optional shared-string and style parts.
pub fn build_workbook_with(
    sheet_xml: &str,
    shared_strings_xml: Option<&str>,
    styles_xml: Option<&str>,
) -> Cursor<Vec<u8>> {
    let mut rels = String::from(
        r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    );
    let mut parts: Vec<(&str, &str)> = vec![
        ("[Content_Types].xml", "<Types/>"),
        (
            "xl/workbook.xml",
            r#"<workbook><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        ("xl/worksheets/sheet1.xml", sheet_xml),
    ];
    if let Some(sst) = shared_strings_xml {
        rels.push_str(
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
        );
        parts.push(("xl/sharedStrings.xml", sst));
    }
    if let Some(styles) = styles_xml {
        rels.push_str(
            r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );
        parts.push(("xl/styles.xml", styles));
    }
    rels.push_str("</Relationships>");
    parts.push(("xl/_rels/workbook.xml.rels", &rels));
    build_archive(&parts)
}

/// Wrap cell markup in worksheet boilerplate.
pub fn worksheet(dimension: &str, rows: &str) -> String {
    format!(
        r#"<worksheet><dimension ref="{}"/><sheetData>{}</sheetData></worksheet>"#,
        dimension, rows
    )
}
