//! The main document part and the package around it

use std::path::Path;
use tracing::debug;
use crate::docx::content_types::{is_word_main_type, ContentTypes, CONTENT_TYPES_PART, HEADER_CONTENT_TYPE};
use crate::docx::header::Header;
use crate::docx::package::{part_dir, rels_part_for, resolve_target, Package};
use crate::docx::rels::{Relationships, HEADER_REL, OFFICE_DOCUMENT_REL};
use crate::docx::xml::{self, qualify, Element};
use crate::docx::{R_NS, W_NS};
use crate::error::{Error, Result};

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const PACKAGE_RELS_PART: &str = "_rels/.rels";

/// Revision-session ids of a paragraph
///
/// Opaque values; they are copied around, never interpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevisionIds {
    /// `w:rsidR`
    pub rsid_r: Option<String>,
    /// `w:rsidRDefault`
    pub rsid_r_default: Option<String>,
}

/// An opened .docx document
#[derive(Debug, Clone)]
pub struct Document {
    package: Package,
    main_part: String,
    root: Element,
    w: String,
    rels: Relationships,
    content_types: ContentTypes,
    default_header: Option<Header>,
}

impl Document {
    /// Open a .docx file
    ///
    /// The file is read completely and closed before parsing starts.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Load a document from the bytes of a .docx package
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(bytes)?;

        let content_types = package
            .get(CONTENT_TYPES_PART)
            .ok_or_else(|| Error::MissingPart(CONTENT_TYPES_PART.to_string()))
            .and_then(ContentTypes::parse)?;

        // Find the main part through the package relationships
        let main_part = match package.get(PACKAGE_RELS_PART) {
            Some(bytes) => Relationships::parse(bytes, PACKAGE_RELS_PART)?
                .first_of_type(OFFICE_DOCUMENT_REL)
                .map(|rel| resolve_target("", &rel.target))
                .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()),
            None => DEFAULT_MAIN_PART.to_string(),
        };

        let main_bytes = package
            .get(&main_part)
            .ok_or_else(|| Error::MissingPart(main_part.clone()))?;

        match content_types.content_type(&main_part) {
            Some(ct) if is_word_main_type(ct) => {}
            other => {
                return Err(Error::InvalidDocument(format!(
                    "{} is not a WordprocessingML document part (content type {})",
                    main_part,
                    other.unwrap_or("unknown")
                )));
            }
        }

        let root = xml::parse(main_bytes, &main_part)?;
        let w = root
            .namespace_prefix(W_NS)
            .ok_or_else(|| {
                Error::InvalidDocument(format!("{} does not declare the WordprocessingML namespace", main_part))
            })?
            .to_string();
        if root.find_child(&qualify(&w, "body")).is_none() {
            return Err(Error::InvalidDocument(format!("{} has no body", main_part)));
        }

        let rels_part = rels_part_for(&main_part);
        let rels = match package.get(&rels_part) {
            Some(bytes) => Relationships::parse(bytes, &rels_part)?,
            None => Relationships::new(),
        };

        let mut doc = Self {
            package,
            main_part,
            root,
            w,
            rels,
            content_types,
            default_header: None,
        };
        doc.default_header = doc.load_default_header()?;

        debug!(
            "Loaded {} with {} body paragraphs, default header: {}",
            doc.main_part,
            doc.body_paragraph_count(),
            doc.default_header.as_ref().map(Header::part_name).unwrap_or("none")
        );

        Ok(doc)
    }

    /// Part name of the main document part, usually `word/document.xml`
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    fn w(&self, local: &str) -> String {
        qualify(&self.w, local)
    }

    fn body(&self) -> Option<&Element> {
        self.root.find_child(&self.w("body"))
    }

    fn body_mut(&mut self) -> Result<&mut Element> {
        let name = self.w("body");
        self.root
            .find_child_mut(&name)
            .ok_or_else(|| Error::InvalidDocument("document has no body".to_string()))
    }

    /// Number of paragraphs directly in the body
    pub fn body_paragraph_count(&self) -> usize {
        let p = self.w("p");
        self.body()
            .map(|body| body.child_elements().filter(|el| el.name == p).count())
            .unwrap_or(0)
    }

    /// Revision ids of the first body paragraph
    pub fn first_paragraph_revision_ids(&self) -> Result<RevisionIds> {
        let p = self.w("p");
        let first = self
            .body()
            .and_then(|body| body.find_child(&p))
            .ok_or(Error::NoBodyParagraph)?;
        Ok(RevisionIds {
            rsid_r: first.attr(&self.w("rsidR")).map(str::to_string),
            rsid_r_default: first.attr(&self.w("rsidRDefault")).map(str::to_string),
        })
    }

    /// The body-level default header, if the document has one
    pub fn default_header(&self) -> Option<&Header> {
        self.default_header.as_ref()
    }

    /// The body-level default header, created if the document has none
    pub fn create_default_header(&mut self) -> Result<&mut Header> {
        if self.default_header.is_none() {
            let header = self.add_default_header()?;
            self.default_header = Some(header);
        }
        self.default_header
            .as_mut()
            .ok_or_else(|| Error::General("default header was not created".to_string()))
    }

    /// Relationship id of the body's default `w:headerReference`
    fn default_header_rel_id(&self) -> Option<String> {
        let body = self.body()?;
        let sect_pr = body.find_child(&self.w("sectPr"))?;
        let type_attr = self.w("type");
        let reference = sect_pr
            .child_elements()
            .filter(|el| el.name == self.w("headerReference"))
            .find(|el| el.attr(&type_attr) == Some("default"))?;

        // xmlns:r may be declared anywhere from the root down to the reference
        let r = Element::lookup_prefix(&[&self.root, body, sect_pr, reference], R_NS)?;
        reference.attr(&qualify(r, "id")).map(str::to_string)
    }

    fn load_default_header(&self) -> Result<Option<Header>> {
        let Some(id) = self.default_header_rel_id() else {
            return Ok(None);
        };
        let rel = self.rels.by_id(&id).ok_or_else(|| {
            Error::InvalidDocument(format!("header reference {} has no relationship", id))
        })?;
        let part = resolve_target(&self.main_part, &rel.target);
        let bytes = self
            .package
            .get(&part)
            .ok_or_else(|| Error::MissingPart(part.clone()))?;
        Header::parse(part, bytes).map(Some)
    }

    /// Create a new header part and reference it as the body's default header
    fn add_default_header(&mut self) -> Result<Header> {
        let dir = part_dir(&self.main_part).to_string();
        let (part, target) = (1..)
            .map(|n| {
                let target = format!("header{}.xml", n);
                let part = if dir.is_empty() {
                    target.clone()
                } else {
                    format!("{}/{}", dir, target)
                };
                (part, target)
            })
            .find(|(part, _)| !self.package.contains(part))
            .ok_or_else(|| Error::General("no free header part name".to_string()))?;

        let id = self.rels.add(HEADER_REL, &target);
        self.content_types.set_override(&part, HEADER_CONTENT_TYPE);

        let r = self.root.declare_namespace("r", R_NS);
        let sect_pr_name = self.w("sectPr");
        let mut reference = Element::new(self.w("headerReference"));
        reference.set_attr(self.w("type"), "default");
        reference.set_attr(qualify(&r, "id"), id.as_str());

        // Header and footer references come first in w:sectPr
        let body = self.body_mut()?;
        body.ensure_child(&sect_pr_name, usize::MAX)
            .insert_child(0, reference);

        debug!("Created default header {} ({})", part, id);
        Ok(Header::new(part))
    }

    /// Serialize the document, with every edited part written back
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut package = self.package.clone();
        package.put(&self.main_part, xml::serialize(&self.root)?);
        package.put(&rels_part_for(&self.main_part), self.rels.to_bytes()?);
        package.put(CONTENT_TYPES_PART, self.content_types.to_bytes()?);
        if let Some(header) = &self.default_header {
            package.put(header.part_name(), header.to_bytes()?);
        }
        package.to_bytes()
    }

    /// Serialize the document and write it to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
