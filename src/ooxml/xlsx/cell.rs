//! Cell values read from SpreadsheetML worksheets.

use crate::sheet::ErrorCode;

/// Last value Excel computed for a formula cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Error(ErrorCode),
    /// No `<v>` element, or an empty one
    Empty,
}

/// Typed content of a source cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Boolean(bool),
    Error(ErrorCode),
    /// Formula text without the leading `=`, plus its cached result
    Formula { formula: String, cached: CachedValue },
    Numeric(f64),
    String(String),
    /// Styled cell without a value
    Blank,
}

impl CellValue {
    /// Short name of the type tag, used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Boolean(_) => "boolean",
            CellValue::Error(_) => "error",
            CellValue::Formula { .. } => "formula",
            CellValue::Numeric(_) => "numeric",
            CellValue::String(_) => "string",
            CellValue::Blank => "blank",
        }
    }
}

impl From<CachedValue> for CellValue {
    fn from(cached: CachedValue) -> Self {
        match cached {
            CachedValue::Number(n) => CellValue::Numeric(n),
            CachedValue::String(s) => CellValue::String(s),
            CachedValue::Boolean(b) => CellValue::Boolean(b),
            CachedValue::Error(e) => CellValue::Error(e),
            CachedValue::Empty => CellValue::Blank,
        }
    }
}

/// A cell comment (note).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub text: String,
}

/// A populated cell of a source worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceCell {
    /// Column index (0-based)
    pub col: u32,
    pub value: CellValue,
    /// Number format id (`numFmtId` of the cell's `cellXfs` entry)
    pub format_id: u16,
    pub comment: Option<Comment>,
}

impl SourceCell {
    pub fn new(col: u32, value: CellValue, format_id: u16) -> Self {
        Self {
            col,
            value,
            format_id,
            comment: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_to_value() {
        assert_eq!(CellValue::from(CachedValue::Number(2.5)), CellValue::Numeric(2.5));
        assert_eq!(CellValue::from(CachedValue::Empty), CellValue::Blank);
        assert_eq!(
            CellValue::from(CachedValue::Error(ErrorCode::Ref)),
            CellValue::Error(ErrorCode::Ref)
        );
    }
}
