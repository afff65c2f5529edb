//! Workbook-level BIFF8 record writers.

use crate::ole::escher::{DrawingCluster, write_dgg_container};
use crate::ole::xls::XlsResult;
use std::io::Write;

use super::{BiffString, CONTINUE, MAX_RECORD_DATA, write_record, write_record_header};

/// Write FORMAT record (number format string)
///
/// Record type: 0x041E
pub fn write_format_record<W: Write>(
    writer: &mut W,
    index_code: u16,
    format_str: &str,
) -> XlsResult<()> {
    // ifmt + XLUnicodeString; format codes are limited to 255 characters
    let code = BiffString::new(format_str).truncated(255);
    let mut data = Vec::with_capacity(5 + code.bytes.len());
    data.extend_from_slice(&index_code.to_le_bytes());
    code.push_long(&mut data);
    write_record(writer, 0x041E, &data)
}

/// Write STYLE record (built-in style)
///
/// Record type: 0x0293
///
/// Built-in styles use the compact 4-byte payload:
///  - ixfe (2 bytes): low 12 bits = XF index, bit 15 = fBuiltIn
///  - builtinStyle (1 byte): built-in style identifier (e.g., 0 = Normal)
///  - outlineLevel (1 byte): 0xFF for non-outline styles
fn write_style_builtin<W: Write>(
    writer: &mut W,
    xf_index: u16,
    builtin_style_id: u8,
) -> XlsResult<()> {
    let xf_field: u16 = (xf_index & 0x0FFF) | 0x8000;

    write_record_header(writer, 0x0293, 4)?;
    writer.write_all(&xf_field.to_le_bytes())?;
    writer.write_all(&[builtin_style_id, 0xFF])?;
    Ok(())
}

/// Write the built-in STYLE records matching the fixed XF table:
///
/// - 0..14: style XFs
/// - 15:    default cell XF
/// - 16..20: style XFs for the comma, currency and percent styles
pub fn write_builtin_styles<W: Write>(writer: &mut W) -> XlsResult<()> {
    // (xf_index, builtin_style_id)
    const MAPPINGS: &[(u16, u8)] = &[
        (0x0010, 3), // Comma
        (0x0011, 6), // Comma [0]
        (0x0012, 4), // Currency
        (0x0013, 7), // Currency [0]
        (0x0000, 0), // Normal
        (0x0014, 5), // Percent
    ];

    for &(xf_index, builtin_id) in MAPPINGS {
        write_style_builtin(writer, xf_index, builtin_id)?;
    }

    Ok(())
}

/// Write UseSelFS (Use Natural Language Formulas) record.
///
/// Record type: 0x0160, Length: 2
pub fn write_usesel_fs<W: Write>(writer: &mut W) -> XlsResult<()> {
    write_record_header(writer, 0x0160, 2)?;
    writer.write_all(&0u16.to_le_bytes())?;
    Ok(())
}

/// Write BOF (Beginning of File) record
///
/// Record type: 0x0809
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `substream_type` - Type of substream (0x0005 = Workbook, 0x0010 = Worksheet)
pub fn write_bof<W: Write>(writer: &mut W, substream_type: u16) -> XlsResult<()> {
    write_record_header(writer, 0x0809, 16)?;

    // BIFF version (0x0600 = BIFF8)
    writer.write_all(&0x0600u16.to_le_bytes())?;
    writer.write_all(&substream_type.to_le_bytes())?;

    // Build identifier and year
    writer.write_all(&0x0DBBu16.to_le_bytes())?;
    writer.write_all(&0x07CCu16.to_le_bytes())?;

    // File history flags
    writer.write_all(&0x00000000u32.to_le_bytes())?;

    // Lowest BIFF version (0x06 = BIFF8)
    writer.write_all(&0x00000006u32.to_le_bytes())?;

    Ok(())
}

/// Write EOF (End of File) record
///
/// Record type: 0x000A
pub fn write_eof<W: Write>(writer: &mut W) -> XlsResult<()> {
    write_record_header(writer, 0x000A, 0)?;
    Ok(())
}

/// Write CODEPAGE record
///
/// Record type: 0x0042. BIFF8 workbooks use 1200 (UTF-16).
pub fn write_codepage<W: Write>(writer: &mut W, codepage: u16) -> XlsResult<()> {
    write_record_header(writer, 0x0042, 2)?;
    writer.write_all(&codepage.to_le_bytes())?;
    Ok(())
}

/// Write DATE1904 record
///
/// Record type: 0x0022
pub fn write_date1904<W: Write>(writer: &mut W, is_1904: bool) -> XlsResult<()> {
    write_record_header(writer, 0x0022, 2)?;
    writer.write_all(&u16::from(is_1904).to_le_bytes())?;
    Ok(())
}

/// Write WINDOW1 record (workbook window properties)
///
/// Record type: 0x003D
pub fn write_window1<W: Write>(writer: &mut W) -> XlsResult<()> {
    write_record_header(writer, 0x003D, 18)?;

    writer.write_all(&0u16.to_le_bytes())?; // xWn
    writer.write_all(&0u16.to_le_bytes())?; // yWn
    writer.write_all(&0x3000u16.to_le_bytes())?; // dxWn
    writer.write_all(&0x1E00u16.to_le_bytes())?; // dyWn
    writer.write_all(&0x0038u16.to_le_bytes())?; // grbit
    writer.write_all(&0u16.to_le_bytes())?; // itabCur
    writer.write_all(&0u16.to_le_bytes())?; // itabFirst
    writer.write_all(&1u16.to_le_bytes())?; // ctabSel
    writer.write_all(&0x0258u16.to_le_bytes())?; // wTabRatio

    Ok(())
}

/// Write SUPBOOK record for the internal workbook.
///
/// Record type: 0x01AE
///
/// - cTab (2 bytes): number of sheets in the workbook
/// - reserved (2 bytes): MUST be 0x0401 (self-referencing)
pub fn write_supbook_internal<W: Write>(writer: &mut W, sheet_count: u16) -> XlsResult<()> {
    write_record_header(writer, 0x01AE, 4)?;
    writer.write_all(&sheet_count.to_le_bytes())?;
    writer.write_all(&0x0401u16.to_le_bytes())?;
    Ok(())
}

/// Write EXTERNSHEET record for internal workbook references.
///
/// Record type: 0x0017
///
/// One XTI entry per worksheet, so a 3D reference's `ixti` equals the
/// 0-based sheet index. Each entry is (ixSupBook = 0, itabFirst, itabLast).
pub fn write_externsheet_internal<W: Write>(writer: &mut W, sheet_count: u16) -> XlsResult<()> {
    if sheet_count == 0 {
        return Ok(());
    }

    let mut data = Vec::with_capacity(2 + usize::from(sheet_count) * 6);
    data.extend_from_slice(&sheet_count.to_le_bytes());
    for itab in 0..sheet_count {
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&itab.to_le_bytes());
        data.extend_from_slice(&itab.to_le_bytes());
    }
    write_record(writer, 0x0017, &data)
}

/// Write BOUNDSHEET8 record (worksheet metadata)
///
/// Record type: 0x0085
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `position` - Absolute stream position of BOF record for this sheet
/// * `hidden_state` - 0 = visible, 1 = hidden, 2 = very hidden
/// * `name` - Sheet name (max 31 characters)
///
/// The sheet name is encoded as ShortXLUnicodeString.
pub fn write_boundsheet<W: Write>(
    writer: &mut W,
    position: u32,
    hidden_state: u8,
    name: &str,
) -> XlsResult<()> {
    let name = BiffString::new(name).truncated(31);

    let mut data = Vec::with_capacity(8 + name.bytes.len());
    data.extend_from_slice(&position.to_le_bytes());
    // hsState in the low byte, dt = 0 (worksheet) in the high byte
    data.extend_from_slice(&[hidden_state & 0x03, 0x00]);
    name.push_short(&mut data);
    write_record(writer, 0x0085, &data)
}

/// Write MSODRAWINGGROUP record holding the workbook's drawing group.
///
/// Record type: 0x00EB, with CONTINUE records past 8224 bytes
pub fn write_msodrawinggroup<W: Write>(
    writer: &mut W,
    clusters: &[DrawingCluster],
) -> XlsResult<()> {
    let mut data = Vec::new();
    write_dgg_container(&mut data, clusters)?;

    let mut chunks = data.chunks(MAX_RECORD_DATA);
    if let Some(first) = chunks.next() {
        write_record(writer, 0x00EB, first)?;
    }
    for chunk in chunks {
        write_record(writer, CONTINUE, chunk)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::records;
    use super::*;

    #[test]
    fn test_boundsheet_hidden_state() {
        let mut buf = Vec::new();
        write_boundsheet(&mut buf, 0x1234, 2, "Data").unwrap();
        let recs = records(&buf);
        let data = &recs[0].1;
        assert_eq!(&data[0..4], &0x1234u32.to_le_bytes());
        assert_eq!(&data[4..6], &[0x02, 0x00]);
        assert_eq!(&data[6..], &[4, 0, b'D', b'a', b't', b'a']);
    }

    #[test]
    fn test_format_record_layout() {
        let mut buf = Vec::new();
        write_format_record(&mut buf, 164, "0.000").unwrap();
        let recs = records(&buf);
        assert_eq!(recs[0].0, 0x041E);
        assert_eq!(recs[0].1, vec![164, 0, 5, 0, 0, b'0', b'.', b'0', b'0', b'0']);
    }

    #[test]
    fn test_externsheet_uses_sheet_indices() {
        let mut buf = Vec::new();
        write_externsheet_internal(&mut buf, 2).unwrap();
        let recs = records(&buf);
        assert_eq!(recs[0].1, vec![2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_drawing_group_record() {
        let clusters = [DrawingCluster {
            drawing_id: 1,
            first_block: 1,
            shape_count: 2,
        }];
        let mut buf = Vec::new();
        write_msodrawinggroup(&mut buf, &clusters).unwrap();
        let recs = records(&buf);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].0, 0x00EB);
        // DggContainer header
        assert_eq!(&recs[0].1[0..4], &[0x0F, 0x00, 0x00, 0xF0]);
    }
}
