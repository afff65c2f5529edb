//! Parser for xl/styles.xml.
//!
//! Only the number-format layer is read: the custom `<numFmt>` codes and the
//! `numFmtId` each `<cellXfs>/<xf>` entry points at. Fonts, fills and borders
//! are not carried over.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::attr_value;
use crate::ooxml::error::{OoxmlError, Result};

/// Number-format information from styles.xml.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberFormatTable {
    /// Custom format codes keyed by `numFmtId`
    pub number_formats: BTreeMap<u16, String>,
    /// `numFmtId` of each cell format, indexed by the cell `s` attribute
    pub cell_formats: Vec<u16>,
}

impl NumberFormatTable {
    /// Number format id for a cell style index; unknown indices fall back to General.
    #[inline]
    pub fn format_id(&self, style_index: usize) -> u16 {
        self.cell_formats.get(style_index).copied().unwrap_or(0)
    }
}

fn parse_format_id(value: Option<String>) -> Option<u16> {
    value.and_then(|v| atoi_simd::parse::<u16>(v.as_bytes()).ok())
}

/// Parse styles from xl/styles.xml XML content.
pub fn parse_styles(content: &str) -> Result<NumberFormatTable> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut table = NumberFormatTable::default();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"numFmts" => parse_number_formats(&mut reader, &mut table.number_formats)?,
                b"cellXfs" => parse_cell_xfs(&mut reader, &mut table.cell_formats)?,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OoxmlError::Xml(format!("styles: {}", e)));
            },
            _ => {},
        }
    }

    Ok(table)
}

/// Parse number formats section.
fn parse_number_formats(
    reader: &mut Reader<&[u8]>,
    number_formats: &mut BTreeMap<u16, String>,
) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"numFmt" => {
                let id = parse_format_id(attr_value(reader, &e, b"numFmtId"));
                let code = attr_value(reader, &e, b"formatCode");

                if let (Some(id), Some(code)) = (id, code) {
                    number_formats.insert(id, code);
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"numFmts" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("numFmts: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Parse the cellXfs section, one format id per `<xf>`.
fn parse_cell_xfs(reader: &mut Reader<&[u8]>, cell_formats: &mut Vec<u16>) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"xf" => {
                cell_formats.push(parse_format_id(attr_value(reader, &e, b"numFmtId")).unwrap_or(0));
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cellXfs" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("cellXfs: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="0.000"/>
    <numFmt numFmtId="165" formatCode="&quot;$&quot;#,##0.00"/>
  </numFmts>
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0"/></cellStyleXfs>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0" xfId="0"/>
    <xf numFmtId="14" fontId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="164" fontId="0" xfId="0" applyNumberFormat="1">
      <alignment horizontal="center"/>
    </xf>
    <xf fontId="0" xfId="0"/>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn test_parse_styles() {
        let table = parse_styles(STYLES).unwrap();
        assert_eq!(table.number_formats.len(), 2);
        assert_eq!(table.number_formats[&165], "\"$\"#,##0.00");
        assert_eq!(table.cell_formats, vec![0, 14, 164, 0]);
    }

    #[test]
    fn test_format_id_lookup() {
        let table = parse_styles(STYLES).unwrap();
        assert_eq!(table.format_id(1), 14);
        assert_eq!(table.format_id(2), 164);
        assert_eq!(table.format_id(99), 0);
    }
}
