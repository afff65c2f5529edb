//! Excel workbook loader.
//!
//! Walks the package relationships from the root to the workbook part, then
//! to each worksheet and its comments, and builds a [`SourceWorkbook`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use xlsdown::ooxml::xlsx::SourceWorkbook;
//!
//! let workbook = SourceWorkbook::open("report.xlsx")?;
//! for sheet in &workbook.sheets {
//!     println!("{}: {} cells", sheet.name, sheet.cell_count());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::path::Path;

use tracing::debug;

use super::parsers::comments_parser::parse_comments;
use super::parsers::styles_parser::{NumberFormatTable, parse_styles};
use super::parsers::workbook_parser::parse_workbook_xml;
use super::parsers::worksheet_parser::{WorksheetContext, parse_worksheet};
use super::shared_strings::SharedStrings;
use super::worksheet::SourceSheet;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::packuri::PACKAGE_URI;
use crate::ooxml::opc::{PackURI, PhysPkgReader, Relationship};

/// Part name used when the package has no officeDocument relationship.
const DEFAULT_WORKBOOK_URI: &str = "/xl/workbook.xml";

/// A fully parsed source workbook.
#[derive(Debug, Clone, Default)]
pub struct SourceWorkbook {
    /// Sheets in tab order
    pub sheets: Vec<SourceSheet>,
    /// Custom number format codes keyed by `numFmtId`
    pub number_formats: BTreeMap<u16, String>,
    /// Dates are counted from 1904-01-01
    pub date1904: bool,
}

impl SourceWorkbook {
    /// Open and parse an .xlsx file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut package = PhysPkgReader::open(path)?;
        Self::load(&mut package)
    }

    /// Parse an .xlsx package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut package = PhysPkgReader::new(reader)?;
        Self::load(&mut package)
    }

    fn load<R: Read + Seek>(package: &mut PhysPkgReader<R>) -> Result<Self> {
        let workbook_uri = locate_workbook(package)?;
        let workbook_xml = read_part_string(package, &workbook_uri)?;
        let info = parse_workbook_xml(&workbook_xml)?;
        let workbook_rels = package.rels_for(&workbook_uri)?;

        let shared_strings = match workbook_rels.part_with_reltype(rt::SHARED_STRINGS) {
            Ok(rel) => SharedStrings::parse(&read_part_string(package, &rel.target_partname()?)?)?,
            Err(_) => SharedStrings::new(),
        };
        let formats = match workbook_rels.part_with_reltype(rt::STYLES) {
            Ok(rel) => parse_styles(&read_part_string(package, &rel.target_partname()?)?)?,
            Err(_) => NumberFormatTable::default(),
        };

        let ctx = WorksheetContext {
            shared_strings: &shared_strings,
            formats: &formats,
            date1904: info.date1904,
        };

        let mut sheets = Vec::with_capacity(info.sheets.len());
        for entry in &info.sheets {
            let rel = workbook_rels.get(&entry.relationship_id).ok_or_else(|| {
                OoxmlError::PartNotFound(format!(
                    "relationship {} of sheet '{}'",
                    entry.relationship_id, entry.name
                ))
            })?;
            let sheet_uri = rel.target_partname()?;
            let rows = parse_worksheet(&read_part_string(package, &sheet_uri)?, &ctx)?;

            let mut sheet = SourceSheet {
                name: entry.name.clone(),
                state: entry.state,
                rows,
            };
            attach_comments(package, &sheet_uri, &mut sheet)?;

            debug!(
                sheet = %sheet.name,
                rows = sheet.rows.len(),
                cells = sheet.cell_count(),
                "parsed worksheet"
            );
            sheets.push(sheet);
        }

        Ok(Self {
            sheets,
            number_formats: formats.number_formats,
            date1904: info.date1904,
        })
    }

    /// Find a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&SourceSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

fn locate_workbook<R: Read + Seek>(package: &mut PhysPkgReader<R>) -> Result<PackURI> {
    let root = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
    let root_rels = package.rels_for(&root)?;

    match root_rels.part_with_reltype(rt::OFFICE_DOCUMENT) {
        Ok(rel) => Ok(rel.target_partname()?),
        Err(_) => Ok(PackURI::new(DEFAULT_WORKBOOK_URI).map_err(OpcError::InvalidPackUri)?),
    }
}

fn read_part_string<R: Read + Seek>(package: &mut PhysPkgReader<R>, uri: &PackURI) -> Result<String> {
    let blob = package.blob_for(uri).map_err(|e| match e {
        OpcError::PartNotFound(name) => OoxmlError::PartNotFound(name),
        other => other.into(),
    })?;
    String::from_utf8(blob)
        .map_err(|_| OoxmlError::InvalidFormat(format!("{} is not valid UTF-8", uri)))
}

/// Attach comments from the sheet's comments parts to populated cells.
fn attach_comments<R: Read + Seek>(
    package: &mut PhysPkgReader<R>,
    sheet_uri: &PackURI,
    sheet: &mut SourceSheet,
) -> Result<()> {
    let sheet_rels = package.rels_for(sheet_uri)?;
    let comment_parts: Vec<PackURI> = sheet_rels
        .parts_with_reltype(rt::COMMENTS)
        .into_iter()
        .map(Relationship::target_partname)
        .collect::<std::result::Result<_, _>>()?;

    for part in comment_parts {
        for anchored in parse_comments(&read_part_string(package, &part)?)? {
            match sheet.cell_mut(anchored.row, anchored.col) {
                Some(cell) => cell.comment = Some(anchored.comment),
                None => debug!(
                    sheet = %sheet.name,
                    row = anchored.row,
                    col = anchored.col,
                    "dropping comment on a cell without content"
                ),
            }
        }
    }

    Ok(())
}
