//! A1-style cell reference helpers.
//!
//! Rows and columns are zero-based everywhere in this crate. The helpers here
//! convert between that representation and the textual `$A$1` form used by
//! SpreadsheetML cell addresses and formulas.

use std::fmt;

/// Last zero-based row index of an Excel 2007+ worksheet.
pub const MAX_ROW: u32 = 1_048_575;

/// Last zero-based column index of an Excel 2007+ worksheet (`XFD`).
pub const MAX_COLUMN: u32 = 16_383;

/// A single cell address with its absolute/relative markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u32,
    /// `$` before the row number
    pub row_abs: bool,
    /// `$` before the column letters
    pub col_abs: bool,
}

impl CellRef {
    /// Create a relative reference.
    pub const fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            row_abs: false,
            col_abs: false,
        }
    }

    /// Move the relative parts of this reference.
    ///
    /// Returns `None` when the result falls outside the worksheet grid.
    pub fn offset(self, row_delta: i64, col_delta: i64) -> Option<Self> {
        let row = if self.row_abs {
            self.row
        } else {
            shift_index(self.row, row_delta, MAX_ROW)?
        };
        let col = if self.col_abs {
            self.col
        } else {
            shift_index(self.col, col_delta, MAX_COLUMN)?
        };
        Some(Self { row, col, ..self })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.col_abs {
            f.write_str("$")?;
        }
        f.write_str(&column_to_letters(self.col))?;
        if self.row_abs {
            f.write_str("$")?;
        }
        write!(f, "{}", self.row + 1)
    }
}

pub(crate) fn shift_index(index: u32, delta: i64, max: u32) -> Option<u32> {
    let moved = i64::from(index) + delta;
    if (0..=i64::from(max)).contains(&moved) {
        u32::try_from(moved).ok()
    } else {
        None
    }
}

/// Convert a zero-based column index to letters (0 -> "A", 25 -> "Z", 26 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut n = col + 1;

    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters to a zero-based index. Case-insensitive.
///
/// Returns `None` for empty input, non-letters, or columns past `XFD`.
pub fn letters_to_column(letters: &[u8]) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let mut col = 0u32;
    for &byte in letters {
        if !byte.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + u32::from(byte.to_ascii_uppercase() - b'A' + 1);
    }

    let col = col - 1;
    (col <= MAX_COLUMN).then_some(col)
}

/// Parse a one-based row number into a zero-based index.
pub fn parse_row_number(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let row: u32 = atoi_simd::parse::<u32>(digits).ok()?;
    if row == 0 || row - 1 > MAX_ROW {
        return None;
    }
    Some(row - 1)
}

/// Parse a cell address such as `B3` or `$B$3`.
pub fn parse_cell_ref(reference: &str) -> Option<CellRef> {
    let bytes = reference.as_bytes();
    let mut pos = 0;

    let col_abs = bytes.first() == Some(&b'$');
    if col_abs {
        pos += 1;
    }
    let letters_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
        pos += 1;
    }
    let col = letters_to_column(&bytes[letters_start..pos])?;

    let row_abs = bytes.get(pos) == Some(&b'$');
    if row_abs {
        pos += 1;
    }
    let row = parse_row_number(&bytes[pos..])?;

    Some(CellRef {
        row,
        col,
        row_abs,
        col_abs,
    })
}

/// Parse a plain cell address into zero-based `(row, col)` coordinates.
pub fn reference_to_coords(reference: &str) -> Option<(u32, u32)> {
    parse_cell_ref(reference).map(|r| (r.row, r.col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(25), "Z");
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(701), "ZZ");
        assert_eq!(column_to_letters(702), "AAA");
        assert_eq!(column_to_letters(MAX_COLUMN), "XFD");

        assert_eq!(letters_to_column(b"A"), Some(0));
        assert_eq!(letters_to_column(b"az"), Some(51));
        assert_eq!(letters_to_column(b"XFD"), Some(MAX_COLUMN));
        assert_eq!(letters_to_column(b"XFE"), None);
        assert_eq!(letters_to_column(b""), None);
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(reference_to_coords("A1"), Some((0, 0)));
        assert_eq!(reference_to_coords("C10"), Some((9, 2)));

        let abs = parse_cell_ref("$B$2").unwrap();
        assert!(abs.row_abs && abs.col_abs);
        assert_eq!((abs.row, abs.col), (1, 1));

        assert!(parse_cell_ref("A0").is_none());
        assert!(parse_cell_ref("A").is_none());
        assert!(parse_cell_ref("1A").is_none());
        assert!(parse_cell_ref("A1048577").is_none());
    }

    #[test]
    fn test_display_and_offset() {
        let r = parse_cell_ref("B$3").unwrap();
        assert_eq!(r.to_string(), "B$3");
        assert_eq!(r.offset(5, 2).unwrap().to_string(), "D$3");
        assert!(CellRef::new(0, 0).offset(-1, 0).is_none());
    }
}
