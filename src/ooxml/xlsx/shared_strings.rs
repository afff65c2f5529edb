//! Shared strings table for Excel files.
//!
//! Cells of type `s` store an index into xl/sharedStrings.xml. Each `<si>`
//! item is either a plain `<t>` or a list of rich-text runs; runs are
//! flattened to plain text since formatting runs are not carried over.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::parsers::read_rich_text;
use crate::ooxml::error::{OoxmlError, Result};

// Performance: Pre-allocate typical capacities to reduce reallocations
const INITIAL_STRINGS_CAPACITY: usize = 1024;

/// Shared strings table.
#[derive(Debug, Default, Clone)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse shared strings from xl/sharedStrings.xml content.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        let mut strings = Vec::with_capacity(INITIAL_STRINGS_CAPACITY);
        let mut buf = Vec::with_capacity(256);

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(read_rich_text(&mut reader, b"si")?);
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(format!("sharedStrings: {}", e))),
                _ => {},
            }
        }

        Ok(Self { strings })
    }

    /// Get a string by its index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Get the number of strings in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shared_strings() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4">
  <si><t>Name</t></si>
  <si><t xml:space="preserve">  padded  </t></si>
  <si><r><rPr><b/></rPr><t>Bold</t></r><r><t>Plain</t></r></si>
  <si/>
  <si><t>Tom &amp; &quot;Jerry&quot;</t></si>
</sst>"#;

        let sst = SharedStrings::parse(xml).unwrap();
        assert_eq!(sst.len(), 5);
        assert_eq!(sst.get(0), Some("Name"));
        assert_eq!(sst.get(1), Some("  padded  "));
        assert_eq!(sst.get(2), Some("BoldPlain"));
        assert_eq!(sst.get(3), Some(""));
        assert_eq!(sst.get(4), Some("Tom & \"Jerry\""));
        assert_eq!(sst.get(5), None);
    }

    #[test]
    fn test_empty_table() {
        let sst = SharedStrings::parse("<sst/>").unwrap();
        assert!(sst.is_empty());
    }
}
