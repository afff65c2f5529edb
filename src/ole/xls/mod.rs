//! Legacy Excel (.xls) workbook writer
//!
//! Produces BIFF8 workbooks (Excel 97-2003) inside an OLE2 compound file.
//! The record layouts follow the "[MS-XLS]: Excel Binary File Format (.xls)
//! Structure" specification.

/// Error types for XLS writing
mod error;

/// BIFF8 record generation and the workbook builder
pub mod writer;

pub use error::{XlsError, XlsResult};
pub use writer::{CellStyleId, FormulaResult, XlsCellValue, XlsSheetVisibility, XlsWriter};
