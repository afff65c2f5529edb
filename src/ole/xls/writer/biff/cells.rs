//! Cell record BIFF8 writers.

use crate::ole::xls::XlsResult;
use std::io::Write;

use super::{BiffString, row_field, write_continued_chars, write_record, write_record_header};

/// Write NUMBER record (floating point cell)
///
/// Record type: 0x0203
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `row` - Row index (0-based)
/// * `col` - Column index (0-based)
/// * `value` - Cell value (f64), stored bit for bit
pub fn write_number<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    value: f64,
) -> XlsResult<()> {
    let row_u16 = row_field(row, col)?;

    write_record_header(writer, 0x0203, 14)?;

    writer.write_all(&row_u16.to_le_bytes())?;
    writer.write_all(&col.to_le_bytes())?;

    // XF record index
    writer.write_all(&xf_index.to_le_bytes())?;

    // IEEE 754 floating point value
    writer.write_all(&value.to_le_bytes())?;

    Ok(())
}

/// Write LABELSST record (string cell with reference to SST)
///
/// Record type: 0x00FD
pub fn write_labelsst<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    sst_index: u32,
) -> XlsResult<()> {
    let row_u16 = row_field(row, col)?;

    // 2 (row) + 2 (col) + 2 (xf) + 4 (sst index) = 10 bytes
    write_record_header(writer, 0x00FD, 10)?;

    writer.write_all(&row_u16.to_le_bytes())?;
    writer.write_all(&col.to_le_bytes())?;
    writer.write_all(&xf_index.to_le_bytes())?;
    writer.write_all(&sst_index.to_le_bytes())?;

    Ok(())
}

/// Write BOOLERR record (boolean or error cell)
///
/// Record type: 0x0205
///
/// `value` is the boolean (0/1) or the BIFF8 error code, selected by `is_error`.
pub fn write_boolerr<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    value: u8,
    is_error: bool,
) -> XlsResult<()> {
    let row_u16 = row_field(row, col)?;

    // 2 (row) + 2 (col) + 2 (xf) + 1 (value) + 1 (is-error flag) = 8 bytes
    write_record_header(writer, 0x0205, 8)?;

    writer.write_all(&row_u16.to_le_bytes())?;
    writer.write_all(&col.to_le_bytes())?;
    writer.write_all(&xf_index.to_le_bytes())?;
    writer.write_all(&[value, u8::from(is_error)])?;

    Ok(())
}

/// Write BLANK record (formatted cell without a value)
///
/// Record type: 0x0201
pub fn write_blank<W: Write>(writer: &mut W, row: u32, col: u16, xf_index: u16) -> XlsResult<()> {
    let row_u16 = row_field(row, col)?;

    write_record_header(writer, 0x0201, 6)?;
    writer.write_all(&row_u16.to_le_bytes())?;
    writer.write_all(&col.to_le_bytes())?;
    writer.write_all(&xf_index.to_le_bytes())?;

    Ok(())
}

/// Cached result stored in a FORMULA record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    /// The string itself follows in a STRING record.
    String,
    Boolean(bool),
    Error(u8),
    /// Empty string result
    Empty,
}

impl FormulaValue {
    /// The 8-byte FormulaValue field. Non-numeric results set the top two
    /// bytes to 0xFFFF, which is a NaN pattern no real number uses.
    fn to_bytes(self) -> [u8; 8] {
        let special = |kind: u8, value: u8| [kind, 0, value, 0, 0, 0, 0xFF, 0xFF];
        match self {
            FormulaValue::Number(n) => n.to_le_bytes(),
            FormulaValue::String => special(0x00, 0),
            FormulaValue::Boolean(b) => special(0x01, u8::from(b)),
            FormulaValue::Error(code) => special(0x02, code),
            FormulaValue::Empty => special(0x03, 0),
        }
    }
}

/// Write FORMULA record
///
/// Record type: 0x0006
///
/// `rgce` holds the encoded parsed expression. A `FormulaValue::String`
/// result must be followed by [`write_string_result`].
pub fn write_formula<W: Write>(
    writer: &mut W,
    row: u32,
    col: u16,
    xf_index: u16,
    value: FormulaValue,
    rgce: &[u8],
) -> XlsResult<()> {
    let row_u16 = row_field(row, col)?;

    let mut data = Vec::with_capacity(22 + rgce.len());
    data.extend_from_slice(&row_u16.to_le_bytes());
    data.extend_from_slice(&col.to_le_bytes());
    data.extend_from_slice(&xf_index.to_le_bytes());
    data.extend_from_slice(&value.to_bytes());
    // fCalcOnLoad
    data.extend_from_slice(&0x0002u16.to_le_bytes());
    // chn (reserved)
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&(rgce.len() as u16).to_le_bytes());
    data.extend_from_slice(rgce);

    write_record(writer, 0x0006, &data)
}

/// Write STRING record carrying a formula's string result
///
/// Record type: 0x0207
pub fn write_string_result<W: Write>(writer: &mut W, value: &str) -> XlsResult<()> {
    let s = BiffString::new(value).truncated(u16::MAX as usize);
    write_continued_chars(writer, 0x0207, &(s.cch as u16).to_le_bytes(), &s)
}

/// Write ROW record
///
/// Record type: 0x0208
///
/// `first_col` and `last_col_plus_one` bound the cells stored in the row; an
/// empty row uses 0 for both.
pub fn write_row<W: Write>(
    writer: &mut W,
    row: u16,
    first_col: u16,
    last_col_plus_one: u16,
) -> XlsResult<()> {
    write_record_header(writer, 0x0208, 16)?;
    writer.write_all(&row.to_le_bytes())?;
    writer.write_all(&first_col.to_le_bytes())?;
    writer.write_all(&last_col_plus_one.to_le_bytes())?;
    // miyRw: default height, 0x00FF twips
    writer.write_all(&0x00FFu16.to_le_bytes())?;
    // reserved1, unused1
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;
    // flags (reserved bit 8 set) and ixfe_val 0x0F
    writer.write_all(&0x0100u16.to_le_bytes())?;
    writer.write_all(&0x000Fu16.to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::records;
    use super::*;

    #[test]
    fn test_write_number() {
        let mut buf = Vec::new();
        write_number(&mut buf, 0, 0, 0x000F, 42.5).unwrap();

        assert_eq!(&buf[0..2], &[0x03, 0x02]); // Record type 0x0203
        assert_eq!(&buf[2..4], &[14, 0]); // Length = 14
        assert_eq!(&buf[10..18], &42.5f64.to_le_bytes());
    }

    #[test]
    fn test_number_rejects_row_beyond_grid() {
        let mut buf = Vec::new();
        assert!(write_number(&mut buf, 70_000, 0, 0x000F, 1.0).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_boolerr_error_flag() {
        let mut buf = Vec::new();
        write_boolerr(&mut buf, 1, 2, 0x000F, 0x07, true).unwrap();
        assert_eq!(&buf[10..12], &[0x07, 0x01]);
    }

    #[test]
    fn test_formula_with_string_result() {
        let mut buf = Vec::new();
        let rgce = [0x17, 0x01, 0x00, b'x'];
        write_formula(&mut buf, 3, 1, 0x000F, FormulaValue::String, &rgce).unwrap();
        write_string_result(&mut buf, "hello").unwrap();

        let recs = records(&buf);
        assert_eq!(recs[0].0, 0x0006);
        let data = &recs[0].1;
        assert_eq!(data.len(), 22 + rgce.len());
        assert_eq!(&data[6..14], &[0, 0, 0, 0, 0, 0, 0xFF, 0xFF]);
        assert_eq!(u16::from_le_bytes([data[20], data[21]]), 4);
        assert_eq!(&data[22..], &rgce);

        assert_eq!(recs[1].0, 0x0207);
        assert_eq!(recs[1].1, vec![5, 0, 0, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_formula_cached_values() {
        assert_eq!(FormulaValue::Boolean(true).to_bytes()[..3], [1, 0, 1]);
        assert_eq!(FormulaValue::Error(0x2A).to_bytes()[..3], [2, 0, 0x2A]);
        assert_eq!(FormulaValue::Empty.to_bytes()[0], 3);
        assert_eq!(FormulaValue::Number(2.5).to_bytes(), 2.5f64.to_le_bytes());
    }

    #[test]
    fn test_row_record() {
        let mut buf = Vec::new();
        write_row(&mut buf, 2, 0, 2).unwrap();
        let recs = records(&buf);
        assert_eq!(recs[0].0, 0x0208);
        assert_eq!(recs[0].1.len(), 16);
        assert_eq!(&recs[0].1[0..6], &[2, 0, 0, 0, 2, 0]);
    }
}
