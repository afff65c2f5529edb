//! Parser for Excel workbook.xml files.
//!
//! Extracts the sheet list (in tab order) and the date system flag.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::attr_value;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::worksheet::SheetState;

// Performance: Pre-allocate typical capacity for worksheets
const INITIAL_SHEETS_CAPACITY: usize = 16;

/// A `<sheet>` entry of workbook.xml.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub sheet_id: u32,
    pub state: SheetState,
    /// Relationship id of the worksheet part
    pub relationship_id: String,
}

/// Workbook-level information.
#[derive(Debug, Clone, Default)]
pub struct WorkbookInfo {
    pub sheets: Vec<SheetEntry>,
    /// Dates are counted from 1904-01-01
    pub date1904: bool,
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true")
}

/// Parse workbook.xml content.
pub fn parse_workbook_xml(content: &str) -> Result<WorkbookInfo> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut info = WorkbookInfo {
        sheets: Vec::with_capacity(INITIAL_SHEETS_CAPACITY),
        date1904: false,
    };
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    if let Some(value) = attr_value(&reader, &e, b"date1904") {
                        info.date1904 = parse_bool(&value);
                    }
                },
                b"sheet" => {
                    let name = attr_value(&reader, &e, b"name");
                    // r:id lives in the relationships namespace; match the local name.
                    let relationship_id = attr_value(&reader, &e, b"id");
                    let sheet_id = attr_value(&reader, &e, b"sheetId")
                        .and_then(|v| atoi_simd::parse::<u32>(v.as_bytes()).ok())
                        .unwrap_or_default();
                    let state = attr_value(&reader, &e, b"state")
                        .map(|v| SheetState::from_attr(&v))
                        .unwrap_or_default();

                    match (name, relationship_id) {
                        (Some(name), Some(relationship_id)) => info.sheets.push(SheetEntry {
                            name,
                            sheet_id,
                            state,
                            relationship_id,
                        }),
                        _ => {
                            return Err(OoxmlError::InvalidFormat(
                                "<sheet> element without name or r:id".to_string(),
                            ));
                        },
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("workbook: {}", e))),
            _ => {},
        }
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workbook() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr date1904="1"/>
  <sheets>
    <sheet name="Data" sheetId="1" r:id="rId1"/>
    <sheet name="R&amp;D" sheetId="5" state="hidden" r:id="rId2"/>
    <sheet name="Secret" sheetId="6" state="veryHidden" r:id="rId3"/>
  </sheets>
</workbook>"#;

        let info = parse_workbook_xml(xml).unwrap();
        assert!(info.date1904);
        assert_eq!(info.sheets.len(), 3);
        assert_eq!(info.sheets[0].name, "Data");
        assert_eq!(info.sheets[0].relationship_id, "rId1");
        assert_eq!(info.sheets[1].name, "R&D");
        assert_eq!(info.sheets[1].sheet_id, 5);
        assert_eq!(info.sheets[1].state, SheetState::Hidden);
        assert_eq!(info.sheets[2].state, SheetState::VeryHidden);
    }

    #[test]
    fn test_default_date_system() {
        let xml = r#"<workbook><sheets><sheet name="A" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
        let info = parse_workbook_xml(xml).unwrap();
        assert!(!info.date1904);
        assert_eq!(info.sheets[0].state, SheetState::Visible);
    }

    #[test]
    fn test_sheet_without_rid() {
        let xml = r#"<workbook><sheets><sheet name="A" sheetId="1"/></sheets></workbook>"#;
        assert!(parse_workbook_xml(xml).is_err());
    }
}
