//! XLS file writing module
//!
//! This module creates Microsoft Excel files in the legacy binary format
//! (.xls files): BIFF8 records inside an OLE2 compound document.

/// BIFF8 record generation
pub(crate) mod biff;

/// Core XLS writer implementation
mod core;

/// Number formats and cell style records
pub mod formatting;

/// Formula tokenization
pub mod formula;

// Re-export public types
pub use core::{FormulaResult, XlsCellValue, XlsSheetVisibility, XlsWriter};
pub use formatting::{CellStyleId, FormattingManager};
pub use formula::{FormulaTokenizer, Ptg};
