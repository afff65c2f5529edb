//! Spreadsheet grid helpers shared by the reader and the writer.
//!
//! - [`reference`]: A1-style addresses and column letters
//! - [`lexer`]: formula text tokenizer with byte spans
//! - [`shift`]: shared-formula reference shifting
//! - [`error_code`]: the cell error values both formats share

pub mod error_code;
pub mod lexer;
pub mod reference;
pub mod shift;

pub use error_code::ErrorCode;
pub use lexer::{LexError, Operator, RefTarget, Reference, Token, tokenize};
pub use reference::{CellRef, column_to_letters, parse_cell_ref, reference_to_coords};
pub use shift::shift_formula;
