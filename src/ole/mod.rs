//! OLE2 binary Office formats.
//!
//! Only the pieces needed to emit legacy Excel workbooks live here: the
//! OfficeArt drawing records used for cell comments and the BIFF8 workbook
//! writer. The compound file container itself comes from the `cfb` crate.

/// OfficeArt (Escher) drawing records
pub mod escher;

/// Legacy Excel workbook (.xls) writer
pub mod xls;
