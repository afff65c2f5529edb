//! Errors raised while reading a source workbook.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OoxmlError>;

#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Package layer failure (ZIP archive, relationships, part names)
    #[error("package error: {0}")]
    Opc(#[from] crate::ooxml::opc::error::OpcError),

    /// Malformed SpreadsheetML
    #[error("XML error: {0}")]
    Xml(String),

    /// A part the workbook refers to is missing from the archive
    #[error("missing part: {0}")]
    PartNotFound(String),

    /// Well-formed XML with content a workbook cannot have
    #[error("invalid workbook content: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

macro_rules! xml_error_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for OoxmlError {
                fn from(err: $ty) -> Self {
                    OoxmlError::Xml(err.to_string())
                }
            }
        )+
    };
}

xml_error_from!(
    quick_xml::Error,
    quick_xml::events::attributes::AttrError,
    quick_xml::encoding::EncodingError,
);
