//! Parser for worksheet comments parts (xl/commentsN.xml).

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{attr_value, read_rich_text, read_text};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::xlsx::cell::Comment;
use crate::sheet::reference_to_coords;

/// A comment anchored at a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellComment {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u32,
    pub comment: Comment,
}

/// Parse a comments part into cell-anchored comments, in document order.
pub fn parse_comments(content: &str) -> Result<Vec<CellComment>> {
    let mut reader = Reader::from_str(content);
    let mut authors: Vec<String> = Vec::new();
    let mut comments = Vec::new();
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"author" => authors.push(read_text(&mut reader, b"author")?),
                b"comment" => {
                    let reference = attr_value(&reader, &e, b"ref").unwrap_or_default();
                    let author_id = attr_value(&reader, &e, b"authorId")
                        .and_then(|v| atoi_simd::parse::<usize>(v.as_bytes()).ok())
                        .unwrap_or(0);
                    let text = read_comment_body(&mut reader)?;

                    // A range anchor puts the note on its top-left cell.
                    let anchor = reference.split(':').next().unwrap_or_default();
                    let (row, col) = reference_to_coords(anchor).ok_or_else(|| {
                        OoxmlError::InvalidFormat(format!("invalid comment reference '{}'", reference))
                    })?;

                    comments.push(CellComment {
                        row,
                        col,
                        comment: Comment {
                            author: authors.get(author_id).cloned().unwrap_or_default(),
                            text,
                        },
                    });
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(format!("comments: {}", e))),
            _ => {},
        }
    }

    Ok(comments)
}

/// Read a `<comment>` element body up to `</comment>`.
fn read_comment_body(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"text" => {
                text.push_str(&read_rich_text(reader, b"text")?);
            },
            Event::End(e) if e.local_name().as_ref() == b"comment" => break,
            Event::Eof => {
                return Err(OoxmlError::Xml("unexpected end of document inside <comment>".to_string()));
            },
            _ => {},
        }
    }

    Ok(text)
}
