//! Error returned by a conversion run.
use std::path::PathBuf;

use thiserror::Error;

use crate::ole::xls::XlsError;
use crate::ooxml::OoxmlError;

/// Main error type for xlsdown conversions.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input path was rejected before any I/O
    #[error("Invalid input {}: {reason}", .path.display())]
    InvalidInput { path: PathBuf, reason: String },

    /// The source workbook is missing, unreadable or malformed
    #[error("Failed to read {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: OoxmlError,
    },

    /// The destination file could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: XlsError,
    },

    /// The destination workbook rejected source content
    #[error("Destination workbook error: {0}")]
    Destination(#[from] XlsError),
}

/// Result type for conversions.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_path() {
        let err = ConvertError::InvalidInput {
            path: PathBuf::from("book.csv"),
            reason: "expected a .xlsx file".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid input book.csv: expected a .xlsx file");

        let err = ConvertError::from(XlsError::DuplicateSheetName("Data".to_string()));
        assert!(matches!(err, ConvertError::Destination(_)));
    }
}
