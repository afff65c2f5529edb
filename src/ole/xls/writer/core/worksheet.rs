use std::collections::BTreeMap;

use crate::sheet::ErrorCode;

use super::{FormulaResult, XlsSheetVisibility};

/// Cell payload after validation; formulas are already tokenized.
#[derive(Debug, Clone)]
pub(super) enum CellRecord {
    Number(f64),
    String(String),
    Boolean(bool),
    Error(ErrorCode),
    Formula {
        /// Encoded parsed expression
        rgce: Vec<u8>,
        cached: FormulaResult,
    },
    Blank,
}

#[derive(Debug, Clone)]
pub(super) struct WritableCell {
    pub record: CellRecord,
    /// XF index written into the cell record
    pub xf_index: u16,
}

#[derive(Debug, Clone)]
pub(super) struct CellComment {
    pub author: String,
    pub text: String,
}

/// Represents a worksheet in the writer
#[derive(Debug)]
pub(super) struct WritableWorksheet {
    /// Worksheet name
    pub name: String,
    pub visibility: XlsSheetVisibility,
    /// Rows in ascending order; a row may exist without cells
    pub rows: BTreeMap<u16, BTreeMap<u16, WritableCell>>,
    /// Comments keyed by (row, col)
    pub comments: BTreeMap<(u16, u16), CellComment>,
}

impl WritableWorksheet {
    pub fn new(name: String) -> Self {
        Self {
            name,
            visibility: XlsSheetVisibility::Visible,
            rows: BTreeMap::new(),
            comments: BTreeMap::new(),
        }
    }

    pub fn ensure_row(&mut self, row: u16) -> &mut BTreeMap<u16, WritableCell> {
        self.rows.entry(row).or_default()
    }

    pub fn insert_cell(&mut self, row: u16, col: u16, cell: WritableCell) {
        self.ensure_row(row).insert(col, cell);
    }

    #[cfg(test)]
    pub fn cell(&self, row: u16, col: u16) -> Option<&WritableCell> {
        self.rows.get(&row).and_then(|cells| cells.get(&col))
    }

    /// DIMENSIONS fields: first row, last row + 1, first column, last column + 1.
    pub fn dimensions(&self) -> (u32, u32, u16, u16) {
        let (Some(first_row), Some(last_row)) = (
            self.rows.keys().next().copied(),
            self.rows.keys().next_back().copied(),
        ) else {
            return (0, 0, 0, 0);
        };

        let mut cols = self
            .rows
            .values()
            .flat_map(|cells| cells.keys().copied());
        let (first_col, last_col) = match cols.next() {
            Some(col) => cols.fold((col, col), |(lo, hi), c| (lo.min(c), hi.max(c))),
            None => return (u32::from(first_row), u32::from(last_row) + 1, 0, 0),
        };

        (
            u32::from(first_row),
            u32::from(last_row) + 1,
            first_col,
            last_col + 1,
        )
    }

    pub fn string_cells(&self) -> impl Iterator<Item = &str> {
        self.rows
            .values()
            .flat_map(|cells| cells.values())
            .filter_map(|cell| match &cell.record {
                CellRecord::String(s) => Some(s.as_str()),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: f64) -> WritableCell {
        WritableCell {
            record: CellRecord::Number(value),
            xf_index: 15,
        }
    }

    #[test]
    fn test_dimensions() {
        let mut sheet = WritableWorksheet::new("Data".to_string());
        assert_eq!(sheet.dimensions(), (0, 0, 0, 0));

        sheet.ensure_row(4);
        assert_eq!(sheet.dimensions(), (4, 5, 0, 0));

        sheet.insert_cell(2, 3, number(1.0));
        sheet.insert_cell(7, 1, number(2.0));
        assert_eq!(sheet.dimensions(), (2, 8, 1, 4));
    }

    #[test]
    fn test_string_cells() {
        let mut sheet = WritableWorksheet::new("Data".to_string());
        sheet.insert_cell(
            0,
            0,
            WritableCell {
                record: CellRecord::String("Name".to_string()),
                xf_index: 15,
            },
        );
        sheet.insert_cell(0, 1, number(3.0));
        assert_eq!(sheet.string_cells().collect::<Vec<_>>(), vec!["Name"]);
    }
}
