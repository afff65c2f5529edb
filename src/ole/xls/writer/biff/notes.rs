//! Cell comment (note) records: drawing shapes, OBJ, TXO and NOTE.
//!
//! A comment in BIFF8 is spread over several records. The sheet's drawing
//! holds one text-box shape per comment; each shape is followed by its OBJ
//! record, a TXO record with the text in CONTINUE records, and after all
//! shapes a NOTE record ties the cell to the object and names the author.

use crate::ole::escher::{
    DrawingCluster, EscherRecordHeader, PATRIARCH_SIZE, PropertyBuilder, ShapeBuilder, ShapeFlags,
    SheetAnchor, prop_id, prop_value, record_type, shape_type, write_client_anchor, write_dg,
    write_patriarch, write_record_header as write_escher_header,
};
use crate::ole::xls::{XlsError, XlsResult};
use std::io::Write;
use zerocopy::IntoBytes;

use super::{BiffString, CONTINUE, write_continued_chars, write_record};

const MSODRAWING: u16 = 0x00EC;
const OBJ: u16 = 0x005D;
const TXO: u16 = 0x01B6;
const NOTE: u16 = 0x001C;

/// Longest comment text a TXO record can describe.
const MAX_NOTE_CHARS: usize = 32_767;

/// One comment anchored at a cell.
#[derive(Debug, Clone, Copy)]
pub struct NoteShape<'a> {
    pub row: u16,
    pub col: u16,
    /// OBJ id, unique within the sheet
    pub object_id: u16,
    pub author: &'a str,
    pub text: &'a str,
}

/// The comment shapes of one worksheet.
#[derive(Debug)]
pub struct NoteDrawing<'a> {
    pub cluster: DrawingCluster,
    pub notes: Vec<NoteShape<'a>>,
}

impl NoteDrawing<'_> {
    /// Cluster for a sheet with `note_count` comments whose shape ids start
    /// in block `first_block`.
    pub fn cluster_for(drawing_id: u32, first_block: u32, note_count: usize) -> XlsResult<DrawingCluster> {
        let shape_count = u32::try_from(note_count)
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| XlsError::InvalidData(format!("{} comments in one drawing", note_count)))?;
        Ok(DrawingCluster {
            drawing_id,
            first_block,
            shape_count,
        })
    }
}

fn note_properties() -> PropertyBuilder {
    PropertyBuilder::new()
        .add_simple(prop_id::TEXT_ID, 0)
        .add_simple(prop_id::TEXT_BOOLEANS, prop_value::TEXT_BOOL_FIT_TO_SHAPE)
        .add_simple(prop_id::FILL_COLOR, prop_value::NOTE_FILL)
        .add_simple(prop_id::FILL_BACK_COLOR, prop_value::NOTE_FILL)
        .add_simple(prop_id::FILL_BOOLEANS, prop_value::FILL_BOOL_DEFAULT)
        .add_simple(prop_id::LINE_COLOR, prop_value::NOTE_LINE)
        .add_simple(prop_id::SHADOW_BOOLEANS, prop_value::SHADOW_BOOL_ON)
        .add_simple(prop_id::SHADOW_COLOR, 0)
        .add_simple(prop_id::GROUP_BOOLEANS, prop_value::GROUP_BOOL_HIDDEN)
}

/// Bytes of one note's SpContainer inside its MSODRAWING record.
fn note_container_size() -> usize {
    EscherRecordHeader::SIZE
        + ShapeBuilder::SIZE
        + note_properties().size()
        + EscherRecordHeader::SIZE
        + SheetAnchor::SIZE
        + EscherRecordHeader::SIZE
}

/// The ClientTextbox atom that closes each note shape in its own MSODRAWING.
const CLIENT_TEXTBOX_SIZE: usize = EscherRecordHeader::SIZE;

fn write_note_container(buf: &mut Vec<u8>, spid: u32, note: &NoteShape<'_>) -> XlsResult<()> {
    // The declared length also covers the ClientTextbox written separately.
    let body = note_container_size() - EscherRecordHeader::SIZE + CLIENT_TEXTBOX_SIZE;
    buf.extend_from_slice(
        EscherRecordHeader::container(record_type::SP_CONTAINER, body as u32).as_bytes(),
    );
    ShapeBuilder::new(shape_type::TEXT_BOX, spid)
        .with_flags(ShapeFlags::HAVE_ANCHOR | ShapeFlags::HAVE_SPT)
        .write(buf)?;
    note_properties().write(buf)?;
    write_client_anchor(buf, &SheetAnchor::note_box(note.row, note.col))?;
    write_escher_header(buf, 0x00, 0, record_type::CLIENT_DATA, 0)?;
    Ok(())
}

/// Write OBJ record describing a note object.
///
/// Record type: 0x005D
fn write_note_obj<W: Write>(writer: &mut W, object_id: u16) -> XlsResult<()> {
    let mut data = Vec::with_capacity(52);
    // ftCmo: ot = 0x19 (comment), fLocked | fPrintable | fAutoLine
    data.extend_from_slice(&0x0015u16.to_le_bytes());
    data.extend_from_slice(&0x0012u16.to_le_bytes());
    data.extend_from_slice(&0x0019u16.to_le_bytes());
    data.extend_from_slice(&object_id.to_le_bytes());
    data.extend_from_slice(&0x4011u16.to_le_bytes());
    data.extend_from_slice(&[0u8; 12]);
    // ftNts: GUID, fSharedNote, unused
    data.extend_from_slice(&0x000Du16.to_le_bytes());
    data.extend_from_slice(&0x0016u16.to_le_bytes());
    data.extend_from_slice(&[0u8; 22]);
    // ftEnd
    data.extend_from_slice(&[0u8; 4]);
    write_record(writer, OBJ, &data)
}

/// Write TXO record plus the CONTINUE records with text and formatting runs.
///
/// Record type: 0x01B6
fn write_note_text<W: Write>(writer: &mut W, text: &str) -> XlsResult<()> {
    let text = BiffString::new(text).truncated(MAX_NOTE_CHARS);
    let cch = text.cch as u16;
    let cb_runs: u16 = if cch > 0 { 16 } else { 0 };

    let mut data = Vec::with_capacity(18);
    // hAlignment = left, vAlignment = top, fLockText
    data.extend_from_slice(&0x0212u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes()); // rot
    data.extend_from_slice(&[0u8; 6]); // reserved
    data.extend_from_slice(&cch.to_le_bytes());
    data.extend_from_slice(&cb_runs.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes()); // ifntEmpty
    data.extend_from_slice(&0u16.to_le_bytes()); // cbFmla
    write_record(writer, TXO, &data)?;

    if cch == 0 {
        return Ok(());
    }

    write_continued_chars(writer, CONTINUE, &[], &text)?;

    // Two runs: font 0 from the first character, and the terminating run.
    let mut runs = Vec::with_capacity(16);
    runs.extend_from_slice(&0u16.to_le_bytes());
    runs.extend_from_slice(&0u16.to_le_bytes());
    runs.extend_from_slice(&0u32.to_le_bytes());
    runs.extend_from_slice(&cch.to_le_bytes());
    runs.extend_from_slice(&0u16.to_le_bytes());
    runs.extend_from_slice(&0u32.to_le_bytes());
    write_record(writer, CONTINUE, &runs)
}

/// Write the drawing, OBJ and TXO records for all notes of a sheet.
///
/// The first MSODRAWING carries the drawing container, the patriarch group
/// and the first shape; each further note gets its own MSODRAWING.
pub fn write_note_drawing<W: Write>(writer: &mut W, drawing: &NoteDrawing<'_>) -> XlsResult<()> {
    let per_note = note_container_size() + CLIENT_TEXTBOX_SIZE;
    let spgr_len = PATRIARCH_SIZE + drawing.notes.len() * per_note;
    let dg_len = EscherRecordHeader::SIZE + 8 + EscherRecordHeader::SIZE + spgr_len;
    let base_spid = drawing.cluster.base_spid();

    for (i, note) in drawing.notes.iter().enumerate() {
        let mut shape = Vec::with_capacity(256);
        if i == 0 {
            shape.extend_from_slice(
                EscherRecordHeader::container(record_type::DG_CONTAINER, dg_len as u32)
                    .as_bytes(),
            );
            write_dg(&mut shape, &drawing.cluster)?;
            shape.extend_from_slice(
                EscherRecordHeader::container(record_type::SPGR_CONTAINER, spgr_len as u32)
                    .as_bytes(),
            );
            write_patriarch(&mut shape, base_spid)?;
        }
        write_note_container(&mut shape, base_spid + 1 + i as u32, note)?;
        write_record(writer, MSODRAWING, &shape)?;

        write_note_obj(writer, note.object_id)?;

        let mut textbox = Vec::with_capacity(CLIENT_TEXTBOX_SIZE);
        write_escher_header(&mut textbox, 0x00, 0, record_type::CLIENT_TEXTBOX, 0)?;
        write_record(writer, MSODRAWING, &textbox)?;

        write_note_text(writer, note.text)?;
    }
    Ok(())
}

/// Write NOTE record
///
/// Record type: 0x001C
pub fn write_note<W: Write>(writer: &mut W, note: &NoteShape<'_>) -> XlsResult<()> {
    let author = BiffString::new(note.author).truncated(255);
    let mut data = Vec::with_capacity(12 + author.bytes.len());
    data.extend_from_slice(&note.row.to_le_bytes());
    data.extend_from_slice(&note.col.to_le_bytes());
    // grbit: note hidden until hovered
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&note.object_id.to_le_bytes());
    author.push_long(&mut data);
    data.push(0);
    write_record(writer, NOTE, &data)
}

#[cfg(test)]
mod tests {
    use super::super::records;
    use super::*;

    fn sample_drawing<'a>(notes: Vec<NoteShape<'a>>) -> NoteDrawing<'a> {
        NoteDrawing {
            cluster: NoteDrawing::cluster_for(1, 1, notes.len()).unwrap(),
            notes,
        }
    }

    #[test]
    fn test_note_container_size() {
        let mut buf = Vec::new();
        let note = NoteShape {
            row: 0,
            col: 0,
            object_id: 1,
            author: "",
            text: "",
        };
        write_note_container(&mut buf, 1025, &note).unwrap();
        assert_eq!(buf.len(), note_container_size());
        assert_eq!(buf.len(), 120);
    }

    #[test]
    fn test_record_sequence() {
        let drawing = sample_drawing(vec![
            NoteShape {
                row: 1,
                col: 1,
                object_id: 1,
                author: "Ana",
                text: "check",
            },
            NoteShape {
                row: 4,
                col: 0,
                object_id: 2,
                author: "Bo",
                text: "",
            },
        ]);
        let mut buf = Vec::new();
        write_note_drawing(&mut buf, &drawing).unwrap();

        let kinds: Vec<u16> = records(&buf).iter().map(|(rt, _)| *rt).collect();
        assert_eq!(
            kinds,
            vec![
                MSODRAWING, OBJ, MSODRAWING, TXO, CONTINUE, CONTINUE, // first note
                MSODRAWING, OBJ, MSODRAWING, TXO, // empty text has no CONTINUE
            ]
        );
    }

    #[test]
    fn test_drawing_lengths_add_up() {
        let drawing = sample_drawing(vec![
            NoteShape {
                row: 0,
                col: 0,
                object_id: 1,
                author: "a",
                text: "x",
            };
            3
        ]);
        let mut buf = Vec::new();
        write_note_drawing(&mut buf, &drawing).unwrap();

        let escher_bytes: usize = records(&buf)
            .iter()
            .filter(|(rt, _)| *rt == MSODRAWING)
            .map(|(_, data)| data.len())
            .sum();
        let first = &records(&buf)[0].1;
        let declared = u32::from_le_bytes(first[4..8].try_into().unwrap()) as usize;
        assert_eq!(declared + 8, escher_bytes);
    }

    #[test]
    fn test_note_record() {
        let note = NoteShape {
            row: 2,
            col: 3,
            object_id: 7,
            author: "Ana",
            text: "hi",
        };
        let mut buf = Vec::new();
        write_note(&mut buf, &note).unwrap();
        let recs = records(&buf);
        assert_eq!(recs[0].0, NOTE);
        assert_eq!(
            recs[0].1,
            vec![2, 0, 3, 0, 0, 0, 7, 0, 3, 0, 0, b'A', b'n', b'a', 0]
        );
    }

    #[test]
    fn test_txo_counts_characters() {
        let mut buf = Vec::new();
        write_note_text(&mut buf, "héllo").unwrap();
        let recs = records(&buf);
        assert_eq!(recs[0].0, TXO);
        assert_eq!(&recs[0].1[10..12], &5u16.to_le_bytes());
        assert_eq!(&recs[0].1[12..14], &16u16.to_le_bytes());
        assert_eq!(recs[1].1.len(), 1 + 5);
        assert_eq!(recs[2].1.len(), 16);
    }
}
