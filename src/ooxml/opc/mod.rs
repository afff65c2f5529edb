/// Open Packaging Conventions (OPC) support.
///
/// The pieces needed to walk a SpreadsheetML package:
///
/// - Part names ([`PackURI`]) and their resolution from relationship targets
/// - `.rels` parsing ([`Relationships`])
/// - ZIP-based physical packaging ([`PhysPkgReader`])

pub mod constants;
pub mod error;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use packuri::PackURI;
pub use phys_pkg::PhysPkgReader;
pub use rel::{Relationship, Relationships};
