//! BIFF record writer for XLS files
//!
//! This module provides functions to generate BIFF8 (Binary Interchange File Format)
//! records for writing XLS files. BIFF8 is the format used by Excel 97-2003.
//!
//! # BIFF Record Structure
//!
//! Each BIFF record consists of:
//! - Record type (2 bytes) - identifies the record
//! - Record length (2 bytes) - length of data in bytes
//! - Record data (variable length, at most 8224 bytes)
//!
//! Longer payloads continue in CONTINUE (0x003C) records.
//!
//! # References
//!
//! Based on Microsoft's "[MS-XLS]: Excel Binary File Format (.xls) Structure" specification.

use super::super::{XlsError, XlsResult};
use std::io::Write;

mod cells;
mod notes;
mod sst;
mod workbook;
mod worksheet;

pub(crate) use cells::{
    FormulaValue, write_blank, write_boolerr, write_formula, write_labelsst, write_number,
    write_row, write_string_result,
};
pub(crate) use notes::{NoteDrawing, NoteShape, write_note, write_note_drawing};
pub(crate) use sst::write_sst;
pub(crate) use workbook::{
    write_bof, write_boundsheet, write_builtin_styles, write_codepage, write_date1904,
    write_eof, write_externsheet_internal, write_format_record, write_msodrawinggroup,
    write_supbook_internal, write_usesel_fs, write_window1,
};
pub(crate) use worksheet::{write_dimensions, write_window2, write_wsbool};

/// Largest payload a single record may carry.
pub(crate) const MAX_RECORD_DATA: usize = 8224;

/// CONTINUE record type
pub(crate) const CONTINUE: u16 = 0x003C;

/// Write a BIFF record header
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `record_type` - BIFF record type (e.g., 0x0809 for BOF)
/// * `data_len` - Length of record data in bytes
#[inline]
pub(crate) fn write_record_header<W: Write>(
    writer: &mut W,
    record_type: u16,
    data_len: u16,
) -> XlsResult<()> {
    writer.write_all(&record_type.to_le_bytes())?;
    writer.write_all(&data_len.to_le_bytes())?;
    Ok(())
}

/// Write a complete record whose payload is already assembled.
pub(crate) fn write_record<W: Write>(writer: &mut W, record_type: u16, data: &[u8]) -> XlsResult<()> {
    let len = u16::try_from(data.len())
        .ok()
        .filter(|&len| usize::from(len) <= MAX_RECORD_DATA)
        .ok_or_else(|| {
            XlsError::InvalidData(format!(
                "record 0x{:04X} payload of {} bytes exceeds the BIFF8 limit",
                record_type,
                data.len()
            ))
        })?;
    write_record_header(writer, record_type, len)?;
    writer.write_all(data)?;
    Ok(())
}

/// Character data of a BIFF8 unicode string.
///
/// Strings whose characters all fit in Latin-1 are stored compressed (one
/// byte per character); anything else is stored as UTF-16LE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BiffString {
    /// Character count (UTF-16 code units)
    pub(crate) cch: usize,
    pub(crate) high_byte: bool,
    pub(crate) bytes: Vec<u8>,
}

impl BiffString {
    pub(crate) fn new(value: &str) -> Self {
        let high_byte = value.chars().any(|c| c as u32 > 0xFF);
        if high_byte {
            let mut bytes = Vec::with_capacity(value.len() * 2);
            let mut cch = 0;
            for unit in value.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
                cch += 1;
            }
            Self {
                cch,
                high_byte,
                bytes,
            }
        } else {
            let bytes: Vec<u8> = value.chars().map(|c| c as u8).collect();
            Self {
                cch: bytes.len(),
                high_byte,
                bytes,
            }
        }
    }

    /// Keep at most `max` characters.
    pub(crate) fn truncated(mut self, max: usize) -> Self {
        if self.cch > max {
            self.cch = max;
            self.bytes.truncate(max * self.char_width());
        }
        self
    }

    #[inline]
    pub(crate) fn char_width(&self) -> usize {
        if self.high_byte { 2 } else { 1 }
    }

    #[inline]
    pub(crate) fn flags(&self) -> u8 {
        u8::from(self.high_byte)
    }

    /// Append as XLUnicodeString (16-bit count, flags, characters).
    pub(crate) fn push_long(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.cch.min(u16::MAX as usize) as u16).to_le_bytes());
        buf.push(self.flags());
        buf.extend_from_slice(&self.bytes);
    }

    /// Append as ShortXLUnicodeString (8-bit count, flags, characters).
    pub(crate) fn push_short(&self, buf: &mut Vec<u8>) {
        buf.push(self.cch.min(u8::MAX as usize) as u8);
        buf.push(self.flags());
        buf.extend_from_slice(&self.bytes);
    }
}

/// Write character data that may not fit into one record.
///
/// The first record carries `head`, the option flags and as many characters
/// as fit. Every following CONTINUE record restarts with the option flags.
/// Characters are never split across records.
pub(crate) fn write_continued_chars<W: Write>(
    writer: &mut W,
    record_type: u16,
    head: &[u8],
    value: &BiffString,
) -> XlsResult<()> {
    let width = value.char_width();
    let mut payload = Vec::with_capacity(MAX_RECORD_DATA);
    payload.extend_from_slice(head);
    payload.push(value.flags());

    let mut rest = value.bytes.as_slice();
    let mut current_type = record_type;
    loop {
        let room = (MAX_RECORD_DATA - payload.len()) / width * width;
        let take = room.min(rest.len());
        payload.extend_from_slice(&rest[..take]);
        rest = &rest[take..];
        write_record(writer, current_type, &payload)?;
        if rest.is_empty() {
            return Ok(());
        }
        payload.clear();
        payload.push(value.flags());
        current_type = CONTINUE;
    }
}

/// Convert a row index to the 16-bit field BIFF8 stores.
pub(crate) fn row_field(row: u32, col: u16) -> XlsResult<u16> {
    u16::try_from(row).map_err(|_| XlsError::InvalidCellReference {
        row,
        col: u32::from(col),
    })
}

/// Split a record stream into (type, payload) pairs.
#[cfg(test)]
pub(crate) fn records(stream: &[u8]) -> Vec<(u16, Vec<u8>)> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos + 4 <= stream.len() {
        let rt = u16::from_le_bytes([stream[pos], stream[pos + 1]]);
        let len = u16::from_le_bytes([stream[pos + 2], stream[pos + 3]]) as usize;
        out.push((rt, stream[pos + 4..pos + 4 + len].to_vec()));
        pos += 4 + len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_bof() {
        let mut buf = Vec::new();
        write_bof(&mut buf, 0x0005).unwrap();

        // Check record type and length
        assert_eq!(&buf[0..2], &[0x09, 0x08]); // Record type 0x0809
        assert_eq!(&buf[2..4], &[16, 0]); // Length = 16
    }

    #[test]
    fn test_write_eof() {
        let mut buf = Vec::new();
        write_eof(&mut buf).unwrap();

        assert_eq!(&buf[0..2], &[0x0A, 0x00]); // Record type 0x000A
        assert_eq!(&buf[2..4], &[0, 0]); // Length = 0
    }

    #[test]
    fn test_latin1_is_compressed() {
        let s = BiffString::new("café");
        assert!(!s.high_byte);
        assert_eq!(s.cch, 4);
        assert_eq!(s.bytes, vec![b'c', b'a', b'f', 0xE9]);

        let wide = BiffString::new("日本");
        assert!(wide.high_byte);
        assert_eq!(wide.cch, 2);
        assert_eq!(wide.bytes.len(), 4);
    }

    #[test]
    fn test_continued_chars_split() {
        let text = "x".repeat(MAX_RECORD_DATA + 10);
        let mut buf = Vec::new();
        write_continued_chars(&mut buf, 0x0207, &[1, 2], &BiffString::new(&text)).unwrap();

        let recs = records(&buf);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].0, 0x0207);
        assert_eq!(recs[0].1.len(), MAX_RECORD_DATA);
        assert_eq!(recs[1].0, CONTINUE);
        // flags byte + remaining characters
        assert_eq!(recs[1].1.len(), 1 + 13);
    }

    #[test]
    fn test_wide_chars_are_not_split() {
        let text = "é日".repeat(3000);
        let mut buf = Vec::new();
        write_continued_chars(&mut buf, CONTINUE, &[], &BiffString::new(&text)).unwrap();
        for (_, payload) in records(&buf) {
            // flags byte followed by whole UTF-16 units
            assert_eq!((payload.len() - 1) % 2, 0);
            assert_eq!(payload[0], 1);
        }
    }

    #[test]
    fn test_row_field_limit() {
        assert_eq!(row_field(65535, 0).unwrap(), 65535);
        assert!(matches!(
            row_field(65536, 3),
            Err(XlsError::InvalidCellReference { row: 65536, col: 3 })
        ));
    }
}
