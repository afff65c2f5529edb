use std::collections::HashMap;

use crate::ole::escher::DrawingCluster;
use crate::ole::xls::writer::biff::{self, FormulaValue, NoteDrawing, NoteShape};
use crate::ole::xls::writer::formatting::FormattingManager;
use crate::ole::xls::{XlsError, XlsResult};

use super::FormulaResult;
use super::worksheet::{CellRecord, WritableCell, WritableWorksheet};

const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
const BOF_WORKSHEET: u16 = 0x0010;
/// CodePage 1200: UTF-16, required by BIFF8
const CODEPAGE_UNICODE: u16 = 0x04B0;
/// ROW records are written in blocks of this many rows, each followed by its cells
const ROW_BLOCK_SIZE: usize = 32;

/// Deduplicated string cell values in first-use order.
#[derive(Debug, Default)]
pub(super) struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, u32>,
    /// Number of string cells, duplicates included (SST.cstTotal)
    total: u32,
}

impl SharedStrings {
    pub fn collect(worksheets: &[WritableWorksheet]) -> Self {
        let mut sst = Self::default();
        for s in worksheets.iter().flat_map(WritableWorksheet::string_cells) {
            sst.total = sst.total.saturating_add(1);
            if !sst.index.contains_key(s) {
                sst.index.insert(s.to_string(), sst.strings.len() as u32);
                sst.strings.push(s.to_string());
            }
        }
        sst
    }

    fn index_of(&self, s: &str) -> XlsResult<u32> {
        self.index
            .get(s)
            .copied()
            .ok_or_else(|| XlsError::InvalidData(format!("string '{}' missing from SST", s)))
    }
}

/// Generate the complete Workbook stream with all BIFF records
pub(super) fn generate_workbook_stream(
    use_1904_dates: bool,
    uses_3d_refs: bool,
    fmt: &FormattingManager,
    worksheets: &[WritableWorksheet],
) -> XlsResult<Vec<u8>> {
    let sheet_count = u16::try_from(worksheets.len())
        .map_err(|_| XlsError::InvalidData("too many worksheets".to_string()))?;
    let strings = SharedStrings::collect(worksheets);

    // One drawing per sheet that carries comments, numbered from 1; shape id
    // blocks are handed out in sheet order
    let mut next_drawing_id = 1;
    let mut next_block = 1;
    let mut clusters: Vec<Option<DrawingCluster>> = Vec::with_capacity(worksheets.len());
    for sheet in worksheets {
        if sheet.comments.is_empty() {
            clusters.push(None);
            continue;
        }
        let cluster = NoteDrawing::cluster_for(next_drawing_id, next_block, sheet.comments.len())?;
        next_drawing_id += 1;
        next_block = cluster.next_block();
        clusters.push(Some(cluster));
    }
    let used_clusters: Vec<DrawingCluster> = clusters.iter().flatten().copied().collect();

    let mut stream = Vec::with_capacity(4096);

    // === Workbook Globals ===

    biff::write_bof(&mut stream, BOF_WORKBOOK_GLOBALS)?;
    biff::write_codepage(&mut stream, CODEPAGE_UNICODE)?;
    biff::write_date1904(&mut stream, use_1904_dates)?;
    biff::write_window1(&mut stream)?;

    // FONT, FORMAT, then XF records; XF 15 is the default cell format
    fmt.write_fonts(&mut stream)?;
    fmt.write_number_formats(&mut stream)?;
    fmt.write_formats(&mut stream)?;

    biff::write_builtin_styles(&mut stream)?;
    biff::write_usesel_fs(&mut stream)?;

    // BoundSheet8 positions are patched once the sheet offsets are known
    let mut boundsheet_offsets = Vec::with_capacity(worksheets.len());
    for sheet in worksheets {
        boundsheet_offsets.push(stream.len());
        biff::write_boundsheet(&mut stream, 0, sheet.visibility.hidden_state(), &sheet.name)?;
    }

    if uses_3d_refs {
        biff::write_supbook_internal(&mut stream, sheet_count)?;
        biff::write_externsheet_internal(&mut stream, sheet_count)?;
    }

    if !used_clusters.is_empty() {
        biff::write_msodrawinggroup(&mut stream, &used_clusters)?;
    }

    if !strings.strings.is_empty() {
        biff::write_sst(&mut stream, &strings.strings, strings.total)?;
    }

    biff::write_eof(&mut stream)?;

    // === Worksheets ===

    let selected = worksheets
        .iter()
        .position(|sheet| sheet.visibility == super::XlsSheetVisibility::Visible)
        .unwrap_or(0);

    let mut sheet_positions = Vec::with_capacity(worksheets.len());
    for (index, (sheet, cluster)) in worksheets.iter().zip(&clusters).enumerate() {
        let position = u32::try_from(stream.len())
            .map_err(|_| XlsError::InvalidData("workbook stream exceeds 4 GiB".to_string()))?;
        sheet_positions.push(position);
        write_worksheet(&mut stream, sheet, &strings, *cluster, index == selected)?;
    }

    for (offset, position) in boundsheet_offsets.iter().zip(sheet_positions) {
        // lbPlyPos is the first field after the 4-byte record header
        let field = offset + 4;
        stream[field..field + 4].copy_from_slice(&position.to_le_bytes());
    }

    Ok(stream)
}

fn write_worksheet(
    stream: &mut Vec<u8>,
    sheet: &WritableWorksheet,
    strings: &SharedStrings,
    cluster: Option<DrawingCluster>,
    selected: bool,
) -> XlsResult<()> {
    biff::write_bof(stream, BOF_WORKSHEET)?;
    biff::write_wsbool(stream)?;

    let (first_row, last_row, first_col, last_col) = sheet.dimensions();
    biff::write_dimensions(stream, first_row, last_row, first_col, last_col)?;

    let rows: Vec<_> = sheet.rows.iter().collect();
    for block in rows.chunks(ROW_BLOCK_SIZE) {
        for &(row, cells) in block {
            let (first, last) = match (cells.keys().next(), cells.keys().next_back()) {
                (Some(first), Some(last)) => (*first, *last + 1),
                _ => (0, 0),
            };
            biff::write_row(stream, *row, first, last)?;
        }
        for &(row, cells) in block {
            for (col, cell) in cells {
                write_cell(stream, u32::from(*row), *col, cell, strings)?;
            }
        }
    }

    if let Some(cluster) = cluster {
        let notes = sheet
            .comments
            .iter()
            .enumerate()
            .map(|(i, (&(row, col), comment))| {
                let object_id = u16::try_from(i + 1).map_err(|_| {
                    XlsError::InvalidData(format!("too many comments on sheet '{}'", sheet.name))
                })?;
                Ok(NoteShape {
                    row,
                    col,
                    object_id,
                    author: &comment.author,
                    text: &comment.text,
                })
            })
            .collect::<XlsResult<Vec<_>>>()?;

        let drawing = NoteDrawing { cluster, notes };
        biff::write_note_drawing(stream, &drawing)?;
        for note in &drawing.notes {
            biff::write_note(stream, note)?;
        }
    }

    biff::write_window2(stream, selected)?;
    biff::write_eof(stream)
}

fn write_cell(
    stream: &mut Vec<u8>,
    row: u32,
    col: u16,
    cell: &WritableCell,
    strings: &SharedStrings,
) -> XlsResult<()> {
    let xf = cell.xf_index;
    match &cell.record {
        CellRecord::Number(value) => biff::write_number(stream, row, col, xf, *value),
        CellRecord::String(s) => biff::write_labelsst(stream, row, col, xf, strings.index_of(s)?),
        CellRecord::Boolean(value) => biff::write_boolerr(stream, row, col, xf, u8::from(*value), false),
        CellRecord::Error(code) => biff::write_boolerr(stream, row, col, xf, code.code(), true),
        CellRecord::Blank => biff::write_blank(stream, row, col, xf),
        CellRecord::Formula { rgce, cached } => {
            let value = match cached {
                FormulaResult::Number(n) => FormulaValue::Number(*n),
                FormulaResult::String(s) if s.is_empty() => FormulaValue::Empty,
                FormulaResult::String(_) => FormulaValue::String,
                FormulaResult::Boolean(b) => FormulaValue::Boolean(*b),
                FormulaResult::Error(code) => FormulaValue::Error(code.code()),
                FormulaResult::Empty => FormulaValue::Empty,
            };
            biff::write_formula(stream, row, col, xf, value, rgce)?;
            if let FormulaResult::String(s) = cached
                && !s.is_empty()
            {
                biff::write_string_result(stream, s)?;
            }
            Ok(())
        },
    }
}
