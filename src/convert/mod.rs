//! XLSX to XLS conversion.
//!
//! [`WorkbookTranscoder`] loads a source workbook, re-creates every sheet,
//! row and cell in a BIFF8 workbook and saves it next to the input.
//!
//! # Example
//!
//! ```rust,no_run
//! use xlsdown::convert::WorkbookTranscoder;
//!
//! let report = WorkbookTranscoder::new("report.xlsx")?.convert()?;
//! println!("{report}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cache;
mod options;

pub use cache::FormatStyleCache;
pub use options::ConvertOptions;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::common::error::{ConvertError, Result};
use crate::ole::xls::{
    FormulaResult, XlsCellValue, XlsError, XlsSheetVisibility, XlsWriter,
};
use crate::ooxml::xlsx::{CachedValue, CellValue, SheetState, SourceCell, SourceRow, SourceWorkbook};
use crate::sheet::CellRef;

/// Counters describing a finished conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub sheets: usize,
    pub rows: usize,
    pub cells: usize,
    /// Formula cells written as formulas
    pub formulas: usize,
    /// Formula cells replaced by their cached value
    pub downgraded_formulas: usize,
    pub comments: usize,
    /// Style records created, one per distinct number format id
    pub styles: usize,
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sheets, {} rows, {} cells ({} formulas, {} downgraded), {} comments, {} styles",
            self.sheets,
            self.rows,
            self.cells,
            self.formulas,
            self.downgraded_formulas,
            self.comments,
            self.styles
        )
    }
}

/// Converts one `.xlsx` file into a `.xls` file.
#[derive(Debug, Clone)]
pub struct WorkbookTranscoder {
    input: PathBuf,
    output: PathBuf,
    options: ConvertOptions,
}

impl WorkbookTranscoder {
    /// Prepare a conversion writing `<stem>.xls` next to `path`.
    ///
    /// Fails with [`ConvertError::InvalidInput`] when the file name does not
    /// end in `.xlsx`; the filesystem is not touched.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, ConvertOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: ConvertOptions) -> Result<Self> {
        let input = path.as_ref().to_path_buf();
        let is_xlsx = input
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
        if !is_xlsx {
            return Err(ConvertError::InvalidInput {
                path: input,
                reason: "expected a file name ending in .xlsx".to_string(),
            });
        }

        let output = options
            .output
            .clone()
            .unwrap_or_else(|| input.with_extension("xls"));
        Ok(Self {
            input,
            output,
            options,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Run the conversion.
    ///
    /// Nothing is written when the source cannot be read or its content is
    /// rejected. An output file this run opened but could not finish is
    /// removed; an existing file that cannot be opened is kept.
    pub fn convert(&self) -> Result<ConversionReport> {
        info!(input = %self.input.display(), output = %self.output.display(), "converting workbook");

        let source = SourceWorkbook::open(&self.input).map_err(|source| {
            error!(input = %self.input.display(), error = %source, "cannot read source workbook");
            ConvertError::SourceRead {
                path: self.input.clone(),
                source,
            }
        })?;

        let (writer, report) = self.transcode(&source).inspect_err(|e| {
            error!(input = %self.input.display(), error = %e, "conversion failed");
        })?;

        self.write_output(&writer)?;

        info!(output = %self.output.display(), %report, "conversion finished");
        Ok(report)
    }

    /// Save `writer` to the output path.
    ///
    /// A file that cannot be opened is left untouched. Once opened, a failed
    /// write removes it.
    fn write_output(&self, writer: &XlsWriter) -> Result<()> {
        let destination_write = |source: XlsError| {
            error!(output = %self.output.display(), error = %source, "cannot write destination workbook");
            ConvertError::DestinationWrite {
                path: self.output.clone(),
                source,
            }
        };

        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.output)
            .map_err(|e| destination_write(e.into()))?;

        let written = writer
            .write_to(file)
            .and_then(|file| Ok(file.sync_all()?));
        if let Err(source) = written {
            if let Err(e) = std::fs::remove_file(&self.output) {
                debug!(output = %self.output.display(), error = %e, "no partial output removed");
            }
            return Err(destination_write(source));
        }
        Ok(())
    }

    /// Build the destination workbook in memory without saving it.
    pub fn transcode(&self, source: &SourceWorkbook) -> Result<(XlsWriter, ConversionReport)> {
        let mut copier = SheetCopier {
            writer: XlsWriter::new(),
            styles: FormatStyleCache::new(),
            report: ConversionReport::default(),
            options: &self.options,
        };
        copier.copy_sheets(source)?;

        let mut report = copier.report;
        report.styles = copier.styles.len();
        Ok((copier.writer, report))
    }
}

/// Mutable state of one transcoding pass.
struct SheetCopier<'a> {
    writer: XlsWriter,
    styles: FormatStyleCache,
    report: ConversionReport,
    options: &'a ConvertOptions,
}

impl SheetCopier<'_> {
    fn copy_sheets(&mut self, source: &SourceWorkbook) -> Result<()> {
        self.writer.set_1904_dates(source.date1904);
        for (id, code) in &source.number_formats {
            self.writer.register_number_format_with_id(*id, code)?;
        }

        // Every sheet exists before the first formula is tokenized, so
        // references to later sheets resolve.
        let mut indices = Vec::with_capacity(source.sheets.len());
        for sheet in &source.sheets {
            let index = self.writer.add_worksheet(&sheet.name)?;
            self.writer
                .set_sheet_visibility(index, visibility(sheet.state))?;
            indices.push(index);
        }

        for (sheet, index) in source.sheets.iter().zip(indices) {
            debug!(sheet = %sheet.name, rows = sheet.rows.len(), cells = sheet.cell_count(), "copying sheet");
            for row in &sheet.rows {
                self.copy_row(&sheet.name, index, row)?;
            }
            self.report.sheets += 1;
        }
        Ok(())
    }

    fn copy_row(&mut self, sheet_name: &str, sheet: usize, row: &SourceRow) -> Result<()> {
        self.writer.ensure_row(sheet, row.index)?;
        for cell in &row.cells {
            self.copy_cell(sheet_name, sheet, row.index, cell)?;
        }
        self.report.rows += 1;
        Ok(())
    }

    fn copy_cell(&mut self, sheet_name: &str, sheet: usize, row: u32, cell: &SourceCell) -> Result<()> {
        let col = u16::try_from(cell.col).map_err(|_| XlsError::InvalidCellReference { row, col: cell.col })?;
        let style = Some(self.styles.style_for(&mut self.writer, cell.format_id)?);

        match &cell.value {
            CellValue::Formula { formula, cached } => {
                match self
                    .writer
                    .write_formula(sheet, row, col, formula, formula_result(cached), style)
                {
                    Ok(()) => self.report.formulas += 1,
                    Err(XlsError::InvalidFormula(reason)) if !self.options.strict_formulas => {
                        warn!(
                            sheet = sheet_name,
                            cell = %CellRef::new(row, cell.col),
                            formula = formula.as_str(),
                            %reason,
                            "formula cannot be written as BIFF8, keeping its cached value"
                        );
                        let fallback = CellValue::from(cached.clone());
                        self.writer
                            .write_cell(sheet, row, col, destination_value(&fallback), style)?;
                        self.report.downgraded_formulas += 1;
                    },
                    Err(e) => return Err(e.into()),
                }
            },
            value => self
                .writer
                .write_cell(sheet, row, col, destination_value(value), style)?,
        }
        self.report.cells += 1;

        if self.options.copy_comments
            && let Some(comment) = &cell.comment
        {
            self.writer
                .set_comment(sheet, row, col, &comment.author, &comment.text)?;
            self.report.comments += 1;
        }
        Ok(())
    }
}

fn visibility(state: SheetState) -> XlsSheetVisibility {
    match state {
        SheetState::Visible => XlsSheetVisibility::Visible,
        SheetState::Hidden => XlsSheetVisibility::Hidden,
        SheetState::VeryHidden => XlsSheetVisibility::VeryHidden,
    }
}

fn formula_result(cached: &CachedValue) -> FormulaResult {
    match cached {
        CachedValue::Number(n) => FormulaResult::Number(*n),
        CachedValue::String(s) => FormulaResult::String(s.clone()),
        CachedValue::Boolean(b) => FormulaResult::Boolean(*b),
        CachedValue::Error(code) => FormulaResult::Error(*code),
        CachedValue::Empty => FormulaResult::Empty,
    }
}

fn destination_value(value: &CellValue) -> XlsCellValue {
    match value {
        CellValue::Boolean(b) => XlsCellValue::Boolean(*b),
        CellValue::Error(code) => XlsCellValue::Error(*code),
        CellValue::Formula { formula, cached } => XlsCellValue::Formula {
            formula: formula.clone(),
            cached: formula_result(cached),
        },
        CellValue::Numeric(n) => XlsCellValue::Number(*n),
        CellValue::String(s) => XlsCellValue::String(s.clone()),
        CellValue::Blank => XlsCellValue::Blank,
    }
}
