//! Errors raised while walking the ZIP package of a workbook.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    /// The package file does not exist
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    /// No ZIP member for the part name
    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// Malformed `.rels` part
    #[error("Relationship XML error: {0}")]
    Xml(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for OpcError {
    fn from(err: quick_xml::Error) -> Self {
        OpcError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OpcError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OpcError::Xml(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
