//! XML parsing modules for Excel files.
//!
//! This module contains specialized parsers for the XML parts of an Excel
//! workbook (.xlsx), plus the text helpers they share.

pub mod comments_parser;
pub mod styles_parser;
pub mod workbook_parser;
pub mod worksheet_parser;

use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::ooxml::error::{OoxmlError, Result};

/// Decode the value of the attribute with the given local name.
pub(crate) fn attr_value(
    reader: &Reader<&[u8]>,
    element: &BytesStart<'_>,
    name: &[u8],
) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .and_then(|attr| attr.decode_and_unescape_value(reader.decoder()).ok())
        .map(|value| value.into_owned())
}

/// Append the replacement text of an entity or character reference.
pub(crate) fn push_reference(out: &mut String, reference: &BytesRef<'_>) -> Result<()> {
    let name = reference.decode()?;

    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        };
        let ch = code
            .and_then(char::from_u32)
            .ok_or_else(|| OoxmlError::Xml(format!("invalid character reference &{};", name)))?;
        out.push(ch);
    } else if let Some(text) = quick_xml::escape::resolve_predefined_entity(&name) {
        out.push_str(text);
    } else {
        return Err(OoxmlError::Xml(format!("unknown entity &{};", name)));
    }

    Ok(())
}

/// Read the text content up to the end tag `end`, keeping whitespace.
pub(crate) fn read_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::with_capacity(128);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.decode()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::GeneralRef(e) => push_reference(&mut text, &e)?,
            Event::End(e) if e.local_name().as_ref() == end => break,
            Event::Eof => {
                return Err(OoxmlError::Xml(format!(
                    "unexpected end of document inside <{}>",
                    String::from_utf8_lossy(end)
                )));
            },
            _ => {},
        }
    }

    Ok(text)
}

/// Read a rich-text container (`<si>`, `<is>`, comment `<text>`).
///
/// The `<t>` runs are concatenated in document order. Phonetic runs
/// (`<rPh>`) are skipped.
pub(crate) fn read_rich_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::with_capacity(256);
    let mut phonetic_depth = 0usize;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPh" => phonetic_depth += 1,
                b"t" if phonetic_depth == 0 => text.push_str(&read_text(reader, b"t")?),
                _ => {},
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                name if name == end => break,
                _ => {},
            },
            Event::Eof => {
                return Err(OoxmlError::Xml(format!(
                    "unexpected end of document inside <{}>",
                    String::from_utf8_lossy(end)
                )));
            },
            _ => {},
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_after_start(xml: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        loop {
            if let Ok(Event::Start(_)) = reader.read_event_into(&mut buf) {
                break;
            }
        }
        reader
    }

    #[test]
    fn test_read_text_with_references() {
        let mut reader = reader_after_start("<t> a &amp; b &#169;&#x41; </t>");
        assert_eq!(read_text(&mut reader, b"t").unwrap(), " a & b \u{a9}A ");
    }

    #[test]
    fn test_read_rich_text_skips_phonetic() {
        let mut reader = reader_after_start(
            "<si><r><rPr><b/></rPr><t>Hello</t></r><r><t xml:space=\"preserve\"> world</t></r><rPh sb=\"0\" eb=\"1\"><t>HA</t></rPh></si>",
        );
        assert_eq!(read_rich_text(&mut reader, b"si").unwrap(), "Hello world");
    }

    #[test]
    fn test_unterminated_text() {
        let mut reader = reader_after_start("<t>abc");
        assert!(read_text(&mut reader, b"t").is_err());
    }
}
