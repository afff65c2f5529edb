//! Relationship parts (`_rels/*.rels`).
//!
//! A `.rels` part lists the relationships of one source part. Each entry maps
//! an rId to a target part (or an external URL) and a relationship type.
use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part URI or external URL
    target_ref: String,

    /// Base URI for resolving relative references
    base_uri: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference as written in the .rels part.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Check the relationship type, ignoring the namespace prefix.
    ///
    /// Transitional (`http://schemas.openxmlformats.org/...`) and strict
    /// (`http://purl.oclc.org/ooxml/...`) packages share the final segment.
    pub fn is_type(&self, reltype: &str) -> bool {
        let last = |s: &str| s.rsplit('/').next().unwrap_or_default().to_string();
        self.reltype == reltype || last(&self.reltype) == last(reltype)
    }

    /// Get the absolute target partname for internal relationships.
    ///
    /// Returns an error if this is an external relationship.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::RelationshipNotFound(format!(
                "{} points outside the package",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source part.
#[derive(Debug)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,

    /// Map of relationship ID to Relationship
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: HashMap::new(),
        }
    }

    /// Parse a `.rels` part.
    ///
    /// # Arguments
    /// * `rels_xml` - Raw bytes of the `.rels` part
    /// * `base_uri` - Directory of the source part, used to resolve targets
    pub fn from_xml(rels_xml: &[u8], base_uri: &str) -> Result<Self> {
        let mut rels = Self::new(base_uri.to_string());
        let mut reader = Reader::from_reader(rels_xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut r_id = None;
                        let mut reltype = None;
                        let mut target_ref = None;
                        let mut is_external = false;

                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = attr.decode_and_unescape_value(reader.decoder())?;
                            match attr.key.as_ref() {
                                b"Id" => r_id = Some(value.into_owned()),
                                b"Type" => reltype = Some(value.into_owned()),
                                b"Target" => target_ref = Some(value.into_owned()),
                                b"TargetMode" => is_external = value == target_mode::EXTERNAL,
                                _ => {},
                            }
                        }

                        if let (Some(id), Some(rt), Some(tr)) = (r_id, reltype, target_ref) {
                            rels.add_relationship(rt, tr, id, is_external);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Add a relationship to the collection.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) {
        let rel = Relationship::new(
            r_id.clone(),
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        );
        self.rels.insert(r_id, rel);
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    /// Internal relationships of one type, ordered by rId.
    pub fn parts_with_reltype(&self, reltype: &str) -> Vec<&Relationship> {
        let mut matching: Vec<&Relationship> = self
            .rels
            .values()
            .filter(|rel| !rel.is_external() && rel.is_type(reltype))
            .collect();
        matching.sort_by(|a, b| a.r_id().cmp(b.r_id()));
        matching
    }

    /// Get the first internal relationship of a specific type.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        self.parts_with_reltype(reltype)
            .first()
            .copied()
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("no relationship of type '{}'", reltype)))
    }

    /// Get the number of relationships in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_rels() {
        let rels = Relationships::from_xml(WORKBOOK_RELS.as_bytes(), "/xl").unwrap();
        assert_eq!(rels.len(), 3);

        let sheet = rels.get("rId1").unwrap();
        assert_eq!(
            sheet.target_partname().unwrap().as_str(),
            "/xl/worksheets/sheet1.xml"
        );

        let link = rels.get("rId3").unwrap();
        assert!(link.is_external());
        assert_eq!(link.target_ref(), "https://example.com/?a=1&b=2");
        assert!(link.target_partname().is_err());
    }

    #[test]
    fn test_part_with_reltype() {
        let rels = Relationships::from_xml(WORKBOOK_RELS.as_bytes(), "/xl").unwrap();
        let styles = rels.part_with_reltype(relationship_type::STYLES).unwrap();
        assert_eq!(styles.r_id(), "rId2");
        assert!(rels.part_with_reltype(relationship_type::SHARED_STRINGS).is_err());
    }

    #[test]
    fn test_parts_with_reltype_ordered_by_id() {
        let mut rels = Relationships::new("/xl/worksheets".to_string());
        for (id, target) in [("rId7", "../comments2.xml"), ("rId2", "../comments1.xml")] {
            rels.add_relationship(
                relationship_type::COMMENTS.to_string(),
                target.to_string(),
                id.to_string(),
                false,
            );
        }
        let targets: Vec<_> = rels
            .parts_with_reltype(relationship_type::COMMENTS)
            .into_iter()
            .map(|rel| rel.target_partname().unwrap().as_str().to_string())
            .collect();
        assert_eq!(targets, vec!["/xl/comments1.xml", "/xl/comments2.xml"]);
    }

    #[test]
    fn test_strict_namespace_matches() {
        let rel = Relationship::new(
            "rId1".to_string(),
            "http://purl.oclc.org/ooxml/officeDocument/relationships/worksheet".to_string(),
            "worksheets/sheet1.xml".to_string(),
            "/xl".to_string(),
            false,
        );
        assert!(rel.is_type(relationship_type::WORKSHEET));
        assert!(!rel.is_type(relationship_type::COMMENTS));
    }
}
