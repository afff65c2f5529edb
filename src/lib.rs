//! xlsdown - Convert Excel 2007+ workbooks (.xlsx) into Excel 97-2003 workbooks (.xls)
//!
//! The converter reads the OOXML package, rebuilds every sheet in a BIFF8
//! workbook and stores it in an OLE2 compound file. Cell values, number
//! formats, formulas and comments survive the trip; formulas that the old
//! format cannot express keep their last computed value.
//!
//! # Features
//!
//! - **XLSX reader**: sheets, shared strings, number formats, comments and shared formulas
//! - **BIFF8 writer**: cells, styles, shared string table, 3D references and notes
//! - **Formula compiler**: Excel formula text to BIFF8 parsed expressions
//!
//! # Example - Converting a workbook
//!
//! ```no_run
//! use xlsdown::{ConvertOptions, WorkbookTranscoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ConvertOptions::new().with_output("legacy/report.xls");
//! let report = WorkbookTranscoder::with_options("report.xlsx", options)?.convert()?;
//! println!("Converted {}", report);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Writing an XLS file directly
//!
//! ```no_run
//! use xlsdown::ole::xls::{FormulaResult, XlsCellValue, XlsWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = XlsWriter::new();
//! let sheet = writer.add_worksheet("Data")?;
//! writer.write_cell(sheet, 0, 0, XlsCellValue::String("Total".into()), None)?;
//! writer.write_formula(sheet, 0, 1, "SUM(C1:C10)", FormulaResult::Empty, None)?;
//! writer.save("data.xls")?;
//! # Ok(())
//! # }
//! ```

/// Error types shared across the crate
pub mod common;

/// XLSX to XLS conversion driver
pub mod convert;

/// OLE2 binary formats: the BIFF8 workbook writer and OfficeArt drawings
pub mod ole;

/// OOXML (Office Open XML) package and workbook reader
pub mod ooxml;

/// Cell references, formula lexing and error values
pub mod sheet;

pub use common::error::{ConvertError, Result};
pub use convert::{ConversionReport, ConvertOptions, WorkbookTranscoder};
