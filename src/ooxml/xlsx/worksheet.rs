//! Worksheet model of the source workbook.

use super::cell::SourceCell;

/// Sheet visibility as stored in `<sheet state="...">`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetState {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl SheetState {
    pub fn from_attr(value: &str) -> Self {
        match value {
            "hidden" => SheetState::Hidden,
            "veryHidden" => SheetState::VeryHidden,
            _ => SheetState::Visible,
        }
    }
}

/// A row of populated cells, sorted by column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceRow {
    /// Row index (0-based)
    pub index: u32,
    pub cells: Vec<SourceCell>,
}

/// A parsed worksheet. Rows are sorted by index and may be sparse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceSheet {
    pub name: String,
    pub state: SheetState,
    pub rows: Vec<SourceRow>,
}

impl SourceSheet {
    /// Look up a populated cell.
    pub fn cell(&self, row: u32, col: u32) -> Option<&SourceCell> {
        let row = self
            .rows
            .binary_search_by_key(&row, |r| r.index)
            .ok()
            .map(|i| &self.rows[i])?;
        row.cells
            .binary_search_by_key(&col, |c| c.col)
            .ok()
            .map(|i| &row.cells[i])
    }

    pub(crate) fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut SourceCell> {
        let row_pos = self.rows.binary_search_by_key(&row, |r| r.index).ok()?;
        let row = &mut self.rows[row_pos];
        let col_pos = row.cells.binary_search_by_key(&col, |c| c.col).ok()?;
        Some(&mut row.cells[col_pos])
    }

    /// Number of populated cells.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::cell::CellValue;

    #[test]
    fn test_cell_lookup() {
        let sheet = SourceSheet {
            name: "Data".to_string(),
            state: SheetState::Visible,
            rows: vec![
                SourceRow {
                    index: 0,
                    cells: vec![SourceCell::new(1, CellValue::Numeric(1.0), 0)],
                },
                SourceRow {
                    index: 4,
                    cells: vec![
                        SourceCell::new(0, CellValue::Blank, 0),
                        SourceCell::new(3, CellValue::Boolean(true), 0),
                    ],
                },
            ],
        };

        assert_eq!(sheet.cell_count(), 3);
        assert_eq!(sheet.cell(4, 3).unwrap().value, CellValue::Boolean(true));
        assert!(sheet.cell(1, 0).is_none());
        assert!(sheet.cell(4, 2).is_none());
    }

    #[test]
    fn test_sheet_state() {
        assert_eq!(SheetState::from_attr("hidden"), SheetState::Hidden);
        assert_eq!(SheetState::from_attr("veryHidden"), SheetState::VeryHidden);
        assert_eq!(SheetState::from_attr("visible"), SheetState::Visible);
    }
}
