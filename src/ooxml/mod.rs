//! Office Open XML (OOXML) workbook reading.
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): package handling (ZIP members, part names, relationships)
//! 2. **SpreadsheetML** (`xlsx`): workbook, worksheet, shared string, style and
//!    comment parts
//!
//! # Example
//!
//! ```rust,no_run
//! use xlsdown::ooxml::xlsx::SourceWorkbook;
//!
//! let workbook = SourceWorkbook::open("book.xlsx")?;
//! println!("{} sheets", workbook.sheets.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod xlsx;

pub use error::{OoxmlError, Result};
pub use opc::PackURI;
