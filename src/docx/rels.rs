//! Relationships parts (`_rels/*.rels`)

use crate::docx::xml::{self, Element};
use crate::error::Result;

pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const HEADER_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";

/// One `<Relationship>` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// A parsed relationships part
#[derive(Debug, Clone)]
pub struct Relationships {
    root: Element,
}

impl Relationships {
    /// Empty relationships part
    pub fn new() -> Self {
        Self {
            root: Element::new("Relationships").with_attr("xmlns", RELATIONSHIPS_NS),
        }
    }

    pub fn parse(bytes: &[u8], part: &str) -> Result<Self> {
        Ok(Self {
            root: xml::parse(bytes, part)?,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        xml::serialize(&self.root)
    }

    pub fn iter(&self) -> impl Iterator<Item = Relationship> + '_ {
        self.root
            .child_elements()
            .filter(|el| el.local_name() == "Relationship")
            .filter_map(|el| {
                Some(Relationship {
                    id: el.attr("Id")?.to_string(),
                    rel_type: el.attr("Type")?.to_string(),
                    target: el.attr("Target")?.to_string(),
                    external: el.attr("TargetMode") == Some("External"),
                })
            })
    }

    pub fn by_id(&self, id: &str) -> Option<Relationship> {
        self.iter().find(|rel| rel.id == id)
    }

    pub fn first_of_type(&self, rel_type: &str) -> Option<Relationship> {
        self.iter().find(|rel| rel.rel_type == rel_type && !rel.external)
    }

    /// Add an internal relationship and return its new id
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        let name = match self.root.name.split_once(':') {
            Some((prefix, _)) => xml::qualify(prefix, "Relationship"),
            None => "Relationship".to_string(),
        };
        self.root.push_child(
            Element::new(name)
                .with_attr("Id", id.as_str())
                .with_attr("Type", rel_type)
                .with_attr("Target", target),
        );
        id
    }

    /// `rId` followed by one more than the highest numeric id in use
    ///
    /// Falls back to the lowest free number when the highest id is already
    /// at the top of the range.
    fn next_id(&self) -> String {
        let used: Vec<u64> = self
            .iter()
            .filter_map(|rel| rel.id.strip_prefix("rId")?.parse::<u64>().ok())
            .collect();
        let next = match used.iter().max() {
            Some(max) => max
                .checked_add(1)
                .or_else(|| (1..u64::MAX).find(|n| !used.contains(n)))
                .unwrap_or(u64::MAX),
            None => 1,
        };
        format!("rId{}", next)
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/><Relationship Id="custom" Type="urn:x" Target="x.xml"/></Relationships>"#;

    #[test]
    fn test_add_allocates_after_highest_id() {
        let mut rels = Relationships::parse(DOCUMENT_RELS.as_bytes(), "rels").unwrap();
        let id = rels.add(HEADER_REL, "header1.xml");
        assert_eq!(id, "rId10");

        let rel = rels.by_id("rId10").unwrap();
        assert_eq!(rel.rel_type, HEADER_REL);
        assert_eq!(rel.target, "header1.xml");
        assert!(!rel.external);
        assert_eq!(rels.add(HEADER_REL, "header2.xml"), "rId11");
    }

    #[test]
    fn test_add_does_not_overflow_at_largest_id() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId4294967295" Type="urn:x" Target="a.xml"/></Relationships>"#;
        let mut rels = Relationships::parse(xml.as_bytes(), "rels").unwrap();
        assert_eq!(rels.add(HEADER_REL, "header1.xml"), "rId4294967296");

        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="urn:x" Target="a.xml"/><Relationship Id="rId18446744073709551615" Type="urn:x" Target="b.xml"/></Relationships>"#;
        let mut rels = Relationships::parse(xml.as_bytes(), "rels").unwrap();
        assert_eq!(rels.add(HEADER_REL, "header1.xml"), "rId2");
    }

    #[test]
    fn test_external_targets_are_flagged() {
        let rels = Relationships::parse(DOCUMENT_RELS.as_bytes(), "rels").unwrap();
        assert!(rels.by_id("rId9").unwrap().external);
        assert_eq!(rels.iter().count(), 4);
    }

    #[test]
    fn test_empty_relationships_start_at_one() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(OFFICE_DOCUMENT_REL, "word/document.xml"), "rId1");
        assert_eq!(
            rels.first_of_type(OFFICE_DOCUMENT_REL).map(|r| r.target),
            Some("word/document.xml".to_string())
        );

        let reparsed = Relationships::parse(&rels.to_bytes().unwrap(), "rels").unwrap();
        assert_eq!(reparsed.iter().count(), 1);
    }
}
