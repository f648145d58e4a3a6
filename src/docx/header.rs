//! Header parts (`word/headerN.xml`)

use crate::docx::xml::{self, qualify, Element};
use crate::docx::{O_NS, R_NS, V_NS, W_NS};
use crate::error::{Error, Result};
use crate::layout::style_value;

/// A parsed header part
#[derive(Debug, Clone)]
pub struct Header {
    part_name: String,
    root: Element,
    w: String,
}

/// A VML shape found in a header, as written in the part
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInfo {
    pub id: Option<String>,
    pub spid: Option<String>,
    pub shape_type: Option<String>,
    pub style: String,
    pub fill_color: Option<String>,
    pub stroked: Option<String>,
    /// `string` attribute of the shape's text path
    pub text: Option<String>,
    /// `style` attribute of the shape's text path
    pub text_style: Option<String>,
}

impl ShapeInfo {
    /// Value of one declaration in the shape's style, e.g. `margin-top`
    pub fn style_value(&self, key: &str) -> Option<&str> {
        style_value(&self.style, key)
    }
}

impl Header {
    /// A fresh, empty `w:hdr` with the namespaces a watermark needs
    pub(crate) fn new(part_name: impl Into<String>) -> Self {
        let root = Element::new("w:hdr")
            .with_attr("xmlns:w", W_NS)
            .with_attr("xmlns:r", R_NS)
            .with_attr("xmlns:v", V_NS)
            .with_attr("xmlns:o", O_NS);
        Self {
            part_name: part_name.into(),
            root,
            w: "w".to_string(),
        }
    }

    pub(crate) fn parse(part_name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let part_name = part_name.into();
        let root = xml::parse(bytes, &part_name)?;
        let w = root
            .namespace_prefix(W_NS)
            .ok_or_else(|| {
                Error::InvalidDocument(format!("{} does not declare the WordprocessingML namespace", part_name))
            })?
            .to_string();
        if root.local_name() != "hdr" {
            return Err(Error::InvalidDocument(format!(
                "{} is not a header part (root element {})",
                part_name, root.name
            )));
        }
        Ok(Self { part_name, root, w })
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        xml::serialize(&self.root)
    }

    /// Part name inside the package, e.g. `word/header1.xml`
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Qualified WordprocessingML name for this part's prefix
    pub fn w(&self, local: &str) -> String {
        qualify(&self.w, local)
    }

    /// Paragraphs directly under the header root
    pub fn paragraphs(&self) -> Vec<&Element> {
        let p = self.w("p");
        self.root.child_elements().filter(|el| el.name == p).collect()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().len()
    }

    /// The paragraph watermark shapes are collected in
    ///
    /// Always the first paragraph; one is appended if the header has none.
    pub fn carrier_paragraph_mut(&mut self) -> &mut Element {
        let p = self.w("p");
        self.root.ensure_child(&p, usize::MAX)
    }

    /// Declare the VML namespaces on the root if needed; returns `(v, o)` prefixes
    pub fn vml_prefixes(&mut self) -> (String, String) {
        let v = self.root.declare_namespace("v", V_NS);
        let o = self.root.declare_namespace("o", O_NS);
        (v, o)
    }

    /// Every `v:shape` in the header, in document order
    pub fn watermark_shapes(&self) -> Vec<ShapeInfo> {
        let (v, o) = match (self.root.namespace_prefix(V_NS), self.root.namespace_prefix(O_NS)) {
            (Some(v), o) => (v, o.unwrap_or("o")),
            (None, _) => return Vec::new(),
        };

        let text_path = qualify(v, "textpath");
        self.root
            .descendants_named(&qualify(v, "shape"))
            .into_iter()
            .map(|shape| {
                let path = shape.find_child(&text_path);
                ShapeInfo {
                    id: shape.attr("id").map(str::to_string),
                    spid: shape.attr(&qualify(o, "spid")).map(str::to_string),
                    shape_type: shape.attr("type").map(str::to_string),
                    style: shape.attr("style").unwrap_or_default().to_string(),
                    fill_color: shape.attr("fillcolor").map(str::to_string),
                    stroked: shape.attr("stroked").map(str::to_string),
                    text: path.and_then(|p| p.attr("string")).map(str::to_string),
                    text_style: path.and_then(|p| p.attr("style")).map(str::to_string),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXISTING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p><w:pPr><w:pStyle w:val="Header"/></w:pPr><w:r><w:t>Company</w:t></w:r></w:p><w:p/></w:hdr>"#;

    #[test]
    fn test_new_header_gets_a_carrier() {
        let mut header = Header::new("word/header1.xml");
        assert_eq!(header.paragraph_count(), 0);

        header.carrier_paragraph_mut().set_attr("w:rsidP", "00AB12CD");
        header.carrier_paragraph_mut();
        assert_eq!(header.paragraph_count(), 1);
        assert_eq!(header.paragraphs()[0].attr("w:rsidP"), Some("00AB12CD"));
    }

    #[test]
    fn test_existing_header_reuses_first_paragraph() {
        let mut header = Header::parse("word/header2.xml", EXISTING.as_bytes()).unwrap();
        assert_eq!(header.paragraph_count(), 2);

        let carrier = header.carrier_paragraph_mut();
        assert_eq!(carrier.text(), "Company");
        assert_eq!(header.paragraph_count(), 2);
        assert!(header.watermark_shapes().is_empty());

        let (v, o) = header.vml_prefixes();
        assert_eq!((v.as_str(), o.as_str()), ("v", "o"));
        assert_eq!(header.root().attr("xmlns:v"), Some(V_NS));
    }

    #[test]
    fn test_parse_rejects_non_header_root() {
        let xml = r#"<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
        let result = Header::parse("word/footer1.xml", xml.as_bytes());
        assert!(matches!(result, Err(Error::InvalidDocument(_))));
    }
}
