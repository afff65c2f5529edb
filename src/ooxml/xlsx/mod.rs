//! Excel 2007+ (.xlsx) workbook reader.
//!
//! Produces a read-only model of the workbook: sheets with sparse, sorted
//! rows of typed cells, the number-format tables and the date system.

pub mod cell;
pub mod parsers;
pub mod shared_strings;
pub mod workbook;
pub mod worksheet;

pub use cell::{CachedValue, CellValue, Comment, SourceCell};
pub use shared_strings::SharedStrings;
pub use workbook::SourceWorkbook;
pub use worksheet::{SheetState, SourceRow, SourceSheet};
