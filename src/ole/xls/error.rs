//! Error types for XLS file writing

use std::fmt;

/// Result type alias for XLS operations
pub type XlsResult<T> = Result<T, XlsError>;

/// Errors that can occur while building or saving an XLS workbook
#[derive(Debug)]
pub enum XlsError {
    /// I/O error, including failures of the compound file container
    Io(std::io::Error),
    /// Formula text that cannot be expressed as BIFF8 tokens
    InvalidFormula(String),
    /// Cell position outside the BIFF8 grid (65536 rows x 256 columns)
    InvalidCellReference {
        /// Row index (0-based)
        row: u32,
        /// Column index (0-based)
        col: u32,
    },
    /// Worksheet not found
    WorksheetNotFound(String),
    /// Sheet name already used in the workbook (names compare case-insensitively)
    DuplicateSheetName(String),
    /// Sheet name rejected by Excel's naming rules
    InvalidSheetName(String),
    /// Style handle not issued by this workbook
    InvalidStyle(u32),
    /// Number format index that cannot carry a format string
    InvalidFormat(u16),
    /// Invalid data
    InvalidData(String),
}

impl fmt::Display for XlsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XlsError::Io(e) => write!(f, "I/O error: {}", e),
            XlsError::InvalidFormula(msg) => {
                write!(f, "Invalid formula: {}", msg)
            },
            XlsError::InvalidCellReference { row, col } => {
                write!(
                    f,
                    "Cell (row {}, column {}) is outside the XLS grid of 65536 rows and 256 columns",
                    row, col
                )
            },
            XlsError::WorksheetNotFound(name) => {
                write!(f, "Worksheet '{}' not found", name)
            },
            XlsError::DuplicateSheetName(name) => {
                write!(f, "Worksheet name '{}' is already used", name)
            },
            XlsError::InvalidSheetName(name) => {
                write!(f, "Invalid worksheet name '{}'", name)
            },
            XlsError::InvalidStyle(handle) => {
                write!(f, "Unknown cell style handle {}", handle)
            },
            XlsError::InvalidFormat(code) => {
                write!(f, "Invalid format code: {}", code)
            },
            XlsError::InvalidData(msg) => {
                write!(f, "Invalid data: {}", msg)
            },
        }
    }
}

impl std::error::Error for XlsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XlsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for XlsError {
    fn from(err: std::io::Error) -> Self {
        XlsError::Io(err)
    }
}

impl From<crate::sheet::LexError> for XlsError {
    fn from(err: crate::sheet::LexError) -> Self {
        XlsError::InvalidFormula(err.to_string())
    }
}
