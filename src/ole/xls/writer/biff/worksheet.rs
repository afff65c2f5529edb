//! Worksheet-level BIFF8 record writers.

use crate::ole::xls::XlsResult;
use std::io::Write;

use super::write_record_header;

/// Write WSBOOL record (Additional Workspace Information)
///
/// Record type: 0x0081, Length: 2
/// Writes default flags indicating a normal worksheet (not dialog sheet).
pub fn write_wsbool<W: Write>(writer: &mut W) -> XlsResult<()> {
    write_record_header(writer, 0x0081, 2)?;
    // WSBool1 = 0xC1 (show auto page breaks, outline symbols), WSBool2 = 0x04
    writer.write_all(&0x04C1u16.to_le_bytes())?;
    Ok(())
}

/// Write WINDOW2 record (Worksheet view settings)
///
/// Record type: 0x023E, Length: 18
///
/// `selected` marks the sheet tab as selected and active; only the first
/// visible sheet should carry it.
pub fn write_window2<W: Write>(writer: &mut W, selected: bool) -> XlsResult<()> {
    write_record_header(writer, 0x023E, 18)?;

    // DISPLAY_GRIDLINES | DISPLAY_ROW_COL_HEADINGS | DISPLAY_ZEROS
    // | DEFAULT_HEADER | DISPLAY_GUTS
    let mut grbit: u16 = 0x00B6;
    if selected {
        // fSelected | fPaged
        grbit |= 0x0600;
    }
    writer.write_all(&grbit.to_le_bytes())?;

    writer.write_all(&0u16.to_le_bytes())?; // rwTop
    writer.write_all(&0u16.to_le_bytes())?; // colLeft
    writer.write_all(&0x0040u16.to_le_bytes())?; // icvHdr
    writer.write_all(&0u16.to_le_bytes())?; // reserved2
    writer.write_all(&0u16.to_le_bytes())?; // wScaleSLV
    writer.write_all(&0u16.to_le_bytes())?; // wScaleNormal
    writer.write_all(&0u16.to_le_bytes())?; // unused
    writer.write_all(&0u16.to_le_bytes())?; // reserved3

    Ok(())
}

/// Write DIMENSIONS record (worksheet dimensions)
///
/// Record type: 0x0200
///
/// # Arguments
///
/// * `writer` - Output writer
/// * `first_row` - First used row
/// * `last_row` - Last used row + 1
/// * `first_col` - First used column
/// * `last_col` - Last used column + 1
pub fn write_dimensions<W: Write>(
    writer: &mut W,
    first_row: u32,
    last_row: u32,
    first_col: u16,
    last_col: u16,
) -> XlsResult<()> {
    write_record_header(writer, 0x0200, 14)?;

    writer.write_all(&first_row.to_le_bytes())?;
    writer.write_all(&last_row.to_le_bytes())?;
    writer.write_all(&first_col.to_le_bytes())?;
    writer.write_all(&last_col.to_le_bytes())?;

    // Reserved (must be 0)
    writer.write_all(&0u16.to_le_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window2_selection_flags() {
        let mut first = Vec::new();
        write_window2(&mut first, true).unwrap();
        assert_eq!(&first[4..6], &0x06B6u16.to_le_bytes());

        let mut other = Vec::new();
        write_window2(&mut other, false).unwrap();
        assert_eq!(&other[4..6], &0x00B6u16.to_le_bytes());
        assert_eq!(other.len(), 4 + 18);
    }

    #[test]
    fn test_dimensions_layout() {
        let mut buf = Vec::new();
        write_dimensions(&mut buf, 0, 3, 0, 2).unwrap();
        assert_eq!(&buf[0..4], &[0x00, 0x02, 14, 0]);
        assert_eq!(&buf[8..12], &3u32.to_le_bytes());
    }
}
