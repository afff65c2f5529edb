//! XLS file writer implementation
//!
//! This module builds a BIFF8 (Excel 97-2003) workbook in memory and stores
//! it as the `Workbook` stream of an OLE2 compound file.
//!
//! # Architecture
//!
//! `XlsWriter` collects sheets, rows, cells, styles and comments. Formulas
//! are tokenized as soon as they are written, so a formula BIFF8 cannot
//! express is reported at the cell that holds it. Nothing is serialized until
//! [`XlsWriter::save`] or [`XlsWriter::write_to`].
//!
//! # Example
//!
//! ```rust,no_run
//! use xlsdown::ole::xls::{XlsCellValue, XlsWriter};
//!
//! let mut writer = XlsWriter::new();
//! let sheet = writer.add_worksheet("Data")?;
//!
//! writer.write_cell(sheet, 0, 0, XlsCellValue::String("Name".into()), None)?;
//! writer.write_cell(sheet, 0, 1, XlsCellValue::Number(42.0), None)?;
//!
//! writer.save("output.xls")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use super::super::error::{XlsError, XlsResult};
use super::formatting::{CellStyleId, FormattingManager};
use super::formula::{FormulaTokenizer, Ptg, encode_ptg_tokens, sheet_names_match};
use crate::sheet::ErrorCode;

mod stream;
mod worksheet;

use self::worksheet::{CellComment, CellRecord, WritableCell, WritableWorksheet};

/// Last row index of a BIFF8 sheet
const MAX_ROW: u32 = 65_535;
/// Last column index of a BIFF8 sheet
const MAX_COL: u16 = 255;
/// Longest sheet name Excel accepts
const MAX_SHEET_NAME_CHARS: usize = 31;
/// Name of the compound file stream holding the BIFF8 records
const WORKBOOK_STREAM: &str = "/Workbook";

/// Cell value type for writing
#[derive(Debug, Clone, PartialEq)]
pub enum XlsCellValue {
    /// String value
    String(String),
    /// Number value (f64)
    Number(f64),
    /// Boolean value
    Boolean(bool),
    /// Error value
    Error(ErrorCode),
    /// Formula text and its last computed result
    Formula {
        formula: String,
        cached: FormulaResult,
    },
    /// Formatted cell without a value
    Blank,
}

/// Last computed result of a formula cell
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaResult {
    Number(f64),
    String(String),
    Boolean(bool),
    Error(ErrorCode),
    /// Never calculated
    Empty,
}

/// Sheet tab visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XlsSheetVisibility {
    #[default]
    Visible,
    Hidden,
    /// Hidden and not listed in Excel's unhide dialog
    VeryHidden,
}

impl XlsSheetVisibility {
    /// BOUNDSHEET hsState value
    pub(crate) fn hidden_state(self) -> u8 {
        match self {
            XlsSheetVisibility::Visible => 0,
            XlsSheetVisibility::Hidden => 1,
            XlsSheetVisibility::VeryHidden => 2,
        }
    }
}

/// XLS file writer
///
/// Provides methods to create XLS (BIFF8) files.
#[derive(Debug)]
pub struct XlsWriter {
    /// Worksheets to write
    worksheets: Vec<WritableWorksheet>,
    /// Use 1904 date system (Mac) instead of 1900 (Windows)
    use_1904_dates: bool,
    /// Set once any formula references a sheet by name
    uses_3d_refs: bool,
    tokenizer: FormulaTokenizer,
    fmt: FormattingManager,
}

impl XlsWriter {
    /// Create a new XLS writer
    pub fn new() -> Self {
        Self {
            worksheets: Vec::new(),
            use_1904_dates: false,
            uses_3d_refs: false,
            tokenizer: FormulaTokenizer::new(),
            fmt: FormattingManager::new(),
        }
    }

    /// Add a new worksheet
    ///
    /// # Arguments
    ///
    /// * `name` - Worksheet name (1 to 31 characters, unique ignoring case)
    ///
    /// # Returns
    ///
    /// * `Result<usize, XlsError>` - Worksheet index or error
    pub fn add_worksheet(&mut self, name: &str) -> XlsResult<usize> {
        let invalid = name.is_empty()
            || name.encode_utf16().count() > MAX_SHEET_NAME_CHARS
            || name.contains(['/', '\\', '?', '*', ':', '[', ']'])
            || name.starts_with('\'')
            || name.ends_with('\'');
        if invalid {
            return Err(XlsError::InvalidSheetName(name.to_string()));
        }

        if self
            .worksheets
            .iter()
            .any(|ws| sheet_names_match(&ws.name, name))
        {
            return Err(XlsError::DuplicateSheetName(name.to_string()));
        }

        let index = self.worksheets.len();
        self.worksheets.push(WritableWorksheet::new(name.to_string()));

        let names: Vec<&str> = self.worksheets.iter().map(|ws| ws.name.as_str()).collect();
        self.tokenizer = FormulaTokenizer::with_sheets(&names);
        Ok(index)
    }

    /// Set whether a sheet tab is visible, hidden or very hidden
    pub fn set_sheet_visibility(
        &mut self,
        sheet: usize,
        visibility: XlsSheetVisibility,
    ) -> XlsResult<()> {
        self.worksheet_mut(sheet)?.visibility = visibility;
        Ok(())
    }

    /// Make sure a ROW record is written for `row`, even without cells
    pub fn ensure_row(&mut self, sheet: usize, row: u32) -> XlsResult<()> {
        let (row, _) = check_position(row, 0)?;
        self.worksheet_mut(sheet)?.ensure_row(row);
        Ok(())
    }

    /// Write a cell, replacing any value already stored at the position
    ///
    /// # Arguments
    ///
    /// * `sheet` - Worksheet index
    /// * `row` - Row index (0-based, at most 65535)
    /// * `col` - Column index (0-based, at most 255)
    /// * `value` - Cell value
    /// * `style` - Style record, or `None` for the default cell format
    pub fn write_cell(
        &mut self,
        sheet: usize,
        row: u32,
        col: u16,
        value: XlsCellValue,
        style: Option<CellStyleId>,
    ) -> XlsResult<()> {
        self.worksheet(sheet)?;
        let (row, col) = check_position(row, col)?;
        let xf_index = self.fmt.cell_xf_index_for(style)?;

        let record = match value {
            XlsCellValue::String(s) => CellRecord::String(s),
            XlsCellValue::Number(n) => CellRecord::Number(n),
            XlsCellValue::Boolean(b) => CellRecord::Boolean(b),
            XlsCellValue::Error(code) => CellRecord::Error(code),
            XlsCellValue::Blank => CellRecord::Blank,
            XlsCellValue::Formula { formula, cached } => {
                let tokens = self.tokenizer.tokenize(&formula)?;
                self.uses_3d_refs |= tokens.iter().any(Ptg::is_3d);
                CellRecord::Formula {
                    rgce: encode_ptg_tokens(&tokens),
                    cached,
                }
            },
        };

        self.worksheet_mut(sheet)?
            .insert_cell(row, col, WritableCell { record, xf_index });
        Ok(())
    }

    /// Write a formula cell with its cached result
    pub fn write_formula(
        &mut self,
        sheet: usize,
        row: u32,
        col: u16,
        formula: &str,
        cached: FormulaResult,
        style: Option<CellStyleId>,
    ) -> XlsResult<()> {
        let value = XlsCellValue::Formula {
            formula: formula.to_string(),
            cached,
        };
        self.write_cell(sheet, row, col, value, style)
    }

    /// Attach a comment to a cell position
    pub fn set_comment(
        &mut self,
        sheet: usize,
        row: u32,
        col: u16,
        author: &str,
        text: &str,
    ) -> XlsResult<()> {
        let (row, col) = check_position(row, col)?;
        self.worksheet_mut(sheet)?.comments.insert(
            (row, col),
            CellComment {
                author: author.to_string(),
                text: text.to_string(),
            },
        );
        Ok(())
    }

    /// Create a new cell style record with the General number format
    pub fn create_cell_style(&mut self) -> XlsResult<CellStyleId> {
        self.fmt.create_cell_style()
    }

    /// Set the number format index of a style record
    pub fn set_data_format(&mut self, style: CellStyleId, format_index: u16) -> XlsResult<()> {
        self.fmt.set_data_format(style, format_index)
    }

    /// Register a number format code under a fixed format index
    pub fn register_number_format_with_id(&mut self, index: u16, code: &str) -> XlsResult<()> {
        self.fmt.register_number_format_with_id(index, code)
    }

    /// Set the date system used by the workbook
    ///
    /// # Arguments
    ///
    /// * `use_1904` - True to use 1904 date system (Mac), false for 1900 (Windows, default)
    pub fn set_1904_dates(&mut self, use_1904: bool) {
        self.use_1904_dates = use_1904;
    }

    /// Save the XLS file
    ///
    /// The file is created or truncated. On error it may be left partially
    /// written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> XlsResult<()> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let file = self.write_to(file)?;
        file.sync_all()?;
        Ok(())
    }

    /// Write the compound file to `writer` and hand it back
    pub fn write_to<W: Read + Write + Seek>(&self, writer: W) -> XlsResult<W> {
        let workbook = self.workbook_stream()?;

        let mut compound = cfb::CompoundFile::create_with_version(cfb::Version::V3, writer)?;
        {
            let mut stream = compound.create_stream(WORKBOOK_STREAM)?;
            stream.write_all(&workbook)?;
            stream.flush()?;
        }
        compound.flush()?;
        Ok(compound.into_inner())
    }

    /// Serialize the workbook into an in-memory compound file
    pub fn to_bytes(&self) -> XlsResult<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// The BIFF8 record stream without the compound file wrapper
    pub(crate) fn workbook_stream(&self) -> XlsResult<Vec<u8>> {
        stream::generate_workbook_stream(
            self.use_1904_dates,
            self.uses_3d_refs,
            &self.fmt,
            &self.worksheets,
        )
    }

    /// Get the number of worksheets in this workbook
    pub fn worksheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Get worksheet name by index
    pub fn worksheet_name(&self, index: usize) -> Option<&str> {
        self.worksheets.get(index).map(|w| w.name.as_str())
    }

    /// Number of style records created so far
    pub fn style_count(&self) -> usize {
        self.fmt.style_count()
    }

    pub fn formatting(&self) -> &FormattingManager {
        &self.fmt
    }

    fn worksheet(&self, sheet: usize) -> XlsResult<&WritableWorksheet> {
        self.worksheets
            .get(sheet)
            .ok_or_else(|| XlsError::WorksheetNotFound(format!("index {}", sheet)))
    }

    fn worksheet_mut(&mut self, sheet: usize) -> XlsResult<&mut WritableWorksheet> {
        self.worksheets
            .get_mut(sheet)
            .ok_or_else(|| XlsError::WorksheetNotFound(format!("index {}", sheet)))
    }
}

impl Default for XlsWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a position against the BIFF8 grid.
fn check_position(row: u32, col: u16) -> XlsResult<(u16, u16)> {
    if row > MAX_ROW || col > MAX_COL {
        return Err(XlsError::InvalidCellReference {
            row,
            col: u32::from(col),
        });
    }
    Ok((row as u16, col))
}

#[cfg(test)]
mod tests {
    use super::super::biff::records;
    use super::*;
    use calamine::{Data, Reader, Xls};

    const BOF: u16 = 0x0809;
    const BOUNDSHEET: u16 = 0x0085;
    const SUPBOOK: u16 = 0x01AE;
    const EXTERNSHEET: u16 = 0x0017;
    const MSODRAWINGGROUP: u16 = 0x00EB;
    const MSODRAWING: u16 = 0x00EC;
    const XF: u16 = 0x00E0;
    const NOTE: u16 = 0x001C;
    const OBJ: u16 = 0x005D;
    const TXO: u16 = 0x01B6;
    const NUMBER: u16 = 0x0203;

    fn sample() -> XlsWriter {
        let mut writer = XlsWriter::new();
        let data = writer.add_worksheet("Data").unwrap();
        let s = |v: &str| XlsCellValue::String(v.to_string());
        writer.write_cell(data, 0, 0, s("Name"), None).unwrap();
        writer.write_cell(data, 0, 1, s("Age"), None).unwrap();
        writer.write_cell(data, 2, 0, s("Ana"), None).unwrap();
        writer
            .write_cell(data, 2, 1, XlsCellValue::Number(30.0), None)
            .unwrap();
        writer
    }

    fn open(writer: &XlsWriter) -> Xls<Cursor<Vec<u8>>> {
        Xls::new(Cursor::new(writer.to_bytes().unwrap())).unwrap()
    }

    #[test]
    fn test_sheet_name_rules() {
        let mut writer = XlsWriter::new();
        writer.add_worksheet("Data").unwrap();
        assert!(matches!(
            writer.add_worksheet("DATA"),
            Err(XlsError::DuplicateSheetName(_))
        ));
        assert!(matches!(
            writer.add_worksheet(""),
            Err(XlsError::InvalidSheetName(_))
        ));
        assert!(matches!(
            writer.add_worksheet(&"x".repeat(32)),
            Err(XlsError::InvalidSheetName(_))
        ));
        assert!(matches!(
            writer.add_worksheet("a/b"),
            Err(XlsError::InvalidSheetName(_))
        ));
        assert_eq!(writer.add_worksheet(&"x".repeat(31)).unwrap(), 1);
        assert_eq!(writer.worksheet_count(), 2);
        assert_eq!(writer.worksheet_name(0), Some("Data"));
    }

    #[test]
    fn test_grid_limits() {
        let mut writer = XlsWriter::new();
        let sheet = writer.add_worksheet("Data").unwrap();
        let err = writer
            .write_cell(sheet, 65_536, 0, XlsCellValue::Number(1.0), None)
            .unwrap_err();
        assert!(matches!(
            err,
            XlsError::InvalidCellReference { row: 65_536, col: 0 }
        ));
        assert!(
            writer
                .write_cell(sheet, 0, 256, XlsCellValue::Blank, None)
                .is_err()
        );
        assert!(
            writer
                .write_cell(sheet, 65_535, 255, XlsCellValue::Blank, None)
                .is_ok()
        );
        assert!(matches!(
            writer.write_cell(3, 0, 0, XlsCellValue::Blank, None),
            Err(XlsError::WorksheetNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_formula_is_not_stored() {
        let mut writer = XlsWriter::new();
        let sheet = writer.add_worksheet("Data").unwrap();
        let err = writer
            .write_formula(sheet, 0, 0, "XLOOKUP(1,A:A,B:B)", FormulaResult::Empty, None)
            .unwrap_err();
        assert!(matches!(err, XlsError::InvalidFormula(_)));
        assert!(writer.worksheets[0].cell(0, 0).is_none());
    }

    #[test]
    fn test_round_trip_values() {
        let mut writer = sample();
        let data = 0;
        writer
            .write_cell(data, 3, 0, XlsCellValue::Boolean(true), None)
            .unwrap();
        writer
            .write_cell(data, 3, 1, XlsCellValue::Error(ErrorCode::Div0), None)
            .unwrap();
        writer
            .write_cell(data, 3, 2, XlsCellValue::Number(0.1 + 0.2), None)
            .unwrap();
        writer
            .write_formula(data, 3, 3, "B3*2", FormulaResult::Number(60.0), None)
            .unwrap();

        let mut xls = open(&writer);
        assert_eq!(xls.sheet_names(), vec!["Data".to_string()]);

        let range = xls.worksheet_range("Data").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Name".into())));
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("Age".into())));
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("Ana".into())));
        assert_eq!(range.get_value((2, 1)), Some(&Data::Float(30.0)));
        assert!(matches!(range.get_value((1, 0)), None | Some(Data::Empty)));
        assert_eq!(range.get_value((3, 0)), Some(&Data::Bool(true)));
        assert!(matches!(range.get_value((3, 1)), Some(Data::Error(_))));
        match range.get_value((3, 2)) {
            Some(Data::Float(f)) => assert_eq!(f.to_bits(), (0.1f64 + 0.2).to_bits()),
            other => panic!("unexpected {other:?}"),
        }

        let formulas = xls.worksheet_formula("Data").unwrap();
        let text = formulas.get_value((3, 3)).unwrap();
        assert!(text.contains("B3"), "{text}");
    }

    #[test]
    fn test_unicode_strings_round_trip() {
        let mut writer = XlsWriter::new();
        let sheet = writer.add_worksheet("Données").unwrap();
        writer
            .write_cell(sheet, 0, 0, XlsCellValue::String("日本語".into()), None)
            .unwrap();
        writer
            .write_cell(sheet, 1, 0, XlsCellValue::String("café".into()), None)
            .unwrap();

        let mut xls = open(&writer);
        assert_eq!(xls.sheet_names(), vec!["Données".to_string()]);
        let range = xls.worksheet_range("Données").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("日本語".into())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("café".into())));
    }

    #[test]
    fn test_boundsheet_positions_point_at_sheet_bof() {
        let mut writer = sample();
        let second = writer.add_worksheet("Hidden").unwrap();
        writer
            .set_sheet_visibility(second, XlsSheetVisibility::Hidden)
            .unwrap();

        let stream = writer.workbook_stream().unwrap();
        let bound: Vec<_> = records(&stream)
            .into_iter()
            .filter(|(rt, _)| *rt == BOUNDSHEET)
            .map(|(_, data)| data)
            .collect();
        assert_eq!(bound.len(), 2);
        assert_eq!(bound[1][4], 1);

        for data in &bound {
            let pos = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
            assert_eq!(u16::from_le_bytes([stream[pos], stream[pos + 1]]), BOF);
            // worksheet substream type
            assert_eq!(&stream[pos + 6..pos + 8], &0x0010u16.to_le_bytes());
        }
    }

    #[test]
    fn test_externsheet_only_with_3d_refs() {
        let writer = sample();
        let stream = writer.workbook_stream().unwrap();
        assert!(!records(&stream).iter().any(|(rt, _)| *rt == SUPBOOK));

        let mut writer = sample();
        let summary = writer.add_worksheet("Summary").unwrap();
        writer
            .write_formula(summary, 0, 0, "SUM(Data!B1:B3)", FormulaResult::Number(30.0), None)
            .unwrap();
        let stream = writer.workbook_stream().unwrap();
        let types: Vec<u16> = records(&stream).iter().map(|(rt, _)| *rt).collect();
        let supbook = types.iter().position(|rt| *rt == SUPBOOK).unwrap();
        assert_eq!(types[supbook + 1], EXTERNSHEET);
        let last_boundsheet = types.iter().rposition(|rt| *rt == BOUNDSHEET).unwrap();
        assert!(supbook > last_boundsheet);

        let mut xls = open(&writer);
        let range = xls.worksheet_range("Summary").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::Float(30.0)));
    }

    #[test]
    fn test_formula_may_reference_later_sheet() {
        let mut writer = XlsWriter::new();
        let first = writer.add_worksheet("First").unwrap();
        writer.add_worksheet("Second").unwrap();
        writer
            .write_formula(first, 0, 0, "Second!A1+1", FormulaResult::Number(1.0), None)
            .unwrap();
        assert!(writer.uses_3d_refs);
    }

    #[test]
    fn test_styles_share_xf_and_carry_format_id() {
        let mut writer = sample();
        writer.register_number_format_with_id(164, "0.000").unwrap();
        let style = writer.create_cell_style().unwrap();
        writer.set_data_format(style, 164).unwrap();
        writer
            .write_cell(0, 5, 0, XlsCellValue::Number(1.5), Some(style))
            .unwrap();
        writer
            .write_cell(0, 5, 1, XlsCellValue::Number(2.5), Some(style))
            .unwrap();
        assert_eq!(writer.style_count(), 1);

        let stream = writer.workbook_stream().unwrap();
        let recs = records(&stream);
        let xfs: Vec<_> = recs.iter().filter(|(rt, _)| *rt == XF).collect();
        assert_eq!(xfs.len(), 22);
        let user_xf = &xfs[21].1;
        assert_eq!(u16::from_le_bytes([user_xf[2], user_xf[3]]), 164);

        let xf_indices: Vec<u16> = recs
            .iter()
            .filter(|(rt, data)| *rt == NUMBER && data[0] == 5)
            .map(|(_, data)| u16::from_le_bytes([data[4], data[5]]))
            .collect();
        assert_eq!(xf_indices, vec![21, 21]);
    }

    #[test]
    fn test_unknown_style_is_rejected() {
        let mut writer = sample();
        let foreign = CellStyleId(7);
        assert!(matches!(
            writer.write_cell(0, 0, 0, XlsCellValue::Blank, Some(foreign)),
            Err(XlsError::InvalidStyle(7))
        ));
    }

    #[test]
    fn test_comment_records() {
        let mut writer = sample();
        writer.set_comment(0, 0, 0, "Ana", "Full name").unwrap();
        writer.set_comment(0, 2, 1, "Ana", "").unwrap();

        let stream = writer.workbook_stream().unwrap();
        let types: Vec<u16> = records(&stream).iter().map(|(rt, _)| *rt).collect();
        assert_eq!(types.iter().filter(|rt| **rt == MSODRAWINGGROUP).count(), 1);
        assert_eq!(types.iter().filter(|rt| **rt == OBJ).count(), 2);
        assert_eq!(types.iter().filter(|rt| **rt == TXO).count(), 2);
        assert_eq!(types.iter().filter(|rt| **rt == NOTE).count(), 2);

        // NOTE records follow the drawing and precede WINDOW2
        let last_txo = types.iter().rposition(|rt| *rt == TXO).unwrap();
        let first_note = types.iter().position(|rt| *rt == NOTE).unwrap();
        let window2 = types.iter().rposition(|rt| *rt == 0x023E).unwrap();
        assert!(last_txo < first_note && first_note < window2);

        // comments do not disturb cell values
        let mut xls = open(&writer);
        let range = xls.worksheet_range("Data").unwrap();
        assert_eq!(range.get_value((2, 1)), Some(&Data::Float(30.0)));
    }

    #[test]
    fn test_comment_shape_ids_stay_in_own_clusters() {
        let mut writer = XlsWriter::new();
        let busy = writer.add_worksheet("Busy").unwrap();
        let quiet = writer.add_worksheet("Quiet").unwrap();
        for row in 0..1100 {
            writer.set_comment(busy, row, 0, "Ana", "n").unwrap();
        }
        writer.set_comment(quiet, 0, 0, "Bo", "last").unwrap();

        let recs = records(&writer.workbook_stream().unwrap());
        let u32_at = |data: &[u8], at: usize| u32::from_le_bytes(data[at..at + 4].try_into().unwrap());

        // Dgg: spidMax, cidcl, cspSaved, cdgSaved, then one FIDCL per 1024 ids
        let group = &recs.iter().find(|(rt, _)| *rt == MSODRAWINGGROUP).unwrap().1;
        assert_eq!(u32_at(group, 16), 3074);
        assert_eq!(u32_at(group, 20), 4);
        let fidcls: Vec<(u32, u32)> = (0..3)
            .map(|i| (u32_at(group, 32 + 8 * i), u32_at(group, 36 + 8 * i)))
            .collect();
        assert_eq!(fidcls, vec![(1, 1024), (1, 77), (2, 2)]);

        // (patriarch spid, spidCur) from the DgContainer opening each sheet drawing
        let ranges: Vec<(u32, u32)> = recs
            .iter()
            .filter(|(rt, data)| *rt == MSODRAWING && data[2..4] == [0x02, 0xF0])
            .map(|(_, data)| (u32_at(data, 72), u32_at(data, 20)))
            .collect();
        assert_eq!(ranges, vec![(1024, 2124), (3072, 3073)]);
        for (index, (first, last)) in ranges.iter().enumerate() {
            for spid in [*first, *last] {
                let (owner, _) = fidcls[(spid / 1024) as usize - 1];
                assert_eq!(owner as usize, index + 1);
            }
        }
    }

    #[test]
    fn test_empty_rows_are_written() {
        let mut writer = sample();
        writer.ensure_row(0, 7).unwrap();
        let stream = writer.workbook_stream().unwrap();
        let rows: Vec<u16> = records(&stream)
            .iter()
            .filter(|(rt, _)| *rt == 0x0208)
            .map(|(_, data)| u16::from_le_bytes([data[0], data[1]]))
            .collect();
        assert_eq!(rows, vec![0, 2, 7]);
    }

    #[test]
    fn test_compound_file_holds_workbook_stream() {
        let writer = sample();
        let bytes = writer.to_bytes().unwrap();
        let mut compound = cfb::CompoundFile::open(Cursor::new(bytes)).unwrap();
        assert_eq!(compound.version(), cfb::Version::V3);
        let mut stream = compound.open_stream(WORKBOOK_STREAM).unwrap();
        let mut data = Vec::new();
        stream.read_to_end(&mut data).unwrap();
        assert_eq!(data, writer.workbook_stream().unwrap());
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xls");
        sample().save(&path).unwrap();
        let mut xls: Xls<_> = calamine::open_workbook(&path).unwrap();
        assert_eq!(xls.sheet_names(), vec!["Data".to_string()]);
        let range = xls.worksheet_range("Data").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Name".into())));
    }
}
