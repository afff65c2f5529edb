//! Shared String Table (SST) BIFF8 writer.

use crate::ole::xls::XlsResult;
use std::io::Write;

use super::{BiffString, CONTINUE, MAX_RECORD_DATA, write_record};

/// Accumulates record payloads, emitting SST first and CONTINUE afterwards.
struct RecordBuffer {
    buf: Vec<u8>,
    record_type: u16,
}

impl RecordBuffer {
    fn new() -> Self {
        Self {
            buf: Vec::with_capacity(MAX_RECORD_DATA),
            record_type: 0x00FC,
        }
    }

    #[inline]
    fn available(&self) -> usize {
        MAX_RECORD_DATA - self.buf.len()
    }

    fn flush<W: Write>(&mut self, writer: &mut W) -> XlsResult<()> {
        write_record(writer, self.record_type, &self.buf)?;
        self.buf.clear();
        self.record_type = CONTINUE;
        Ok(())
    }
}

/// Write SST (Shared String Table) record with CONTINUE support
///
/// Record type: 0x00FC
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `strings` - Unique strings in index order
/// * `cst_total` - Number of string cell references in the workbook
///
/// A string header (character count and flags) always shares its record with
/// at least its first character. When character data crosses into a CONTINUE
/// record, that record starts with the string's option flags again.
pub fn write_sst<W: Write>(writer: &mut W, strings: &[String], cst_total: u32) -> XlsResult<()> {
    let mut out = RecordBuffer::new();
    out.buf.extend_from_slice(&cst_total.to_le_bytes());
    out.buf.extend_from_slice(&(strings.len() as u32).to_le_bytes());

    for s in strings {
        let encoded = BiffString::new(s).truncated(u16::MAX as usize);
        let width = encoded.char_width();

        if out.available() < 3 + width {
            out.flush(writer)?;
        }
        out.buf
            .extend_from_slice(&(encoded.cch as u16).to_le_bytes());
        out.buf.push(encoded.flags());

        let mut rest = encoded.bytes.as_slice();
        while !rest.is_empty() {
            let room = out.available() / width * width;
            if room == 0 {
                out.flush(writer)?;
                out.buf.push(encoded.flags());
                continue;
            }
            let take = room.min(rest.len());
            out.buf.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
        }
    }

    out.flush(writer)
}
