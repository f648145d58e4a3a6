//! `[Content_Types].xml`

use crate::docx::xml::{self, Element};
use crate::error::Result;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const HEADER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";

/// Content types a main document part may carry (.docx, .dotx, .docm, .dotm)
pub const WORD_MAIN_CONTENT_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml",
    "application/vnd.ms-word.document.macroEnabled.main+xml",
    "application/vnd.ms-word.template.macroEnabledTemplate.main+xml",
];

/// Whether `content_type` belongs to a Word main document part
pub fn is_word_main_type(content_type: &str) -> bool {
    WORD_MAIN_CONTENT_TYPES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(content_type.trim()))
}

#[derive(Debug, Clone)]
pub struct ContentTypes {
    root: Element,
}

impl ContentTypes {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            root: xml::parse(bytes, CONTENT_TYPES_PART)?,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        xml::serialize(&self.root)
    }

    /// Content type of a part: its override first, then its extension default
    pub fn content_type(&self, part: &str) -> Option<&str> {
        let part_name = format!("/{}", part);
        let by_override = self
            .root
            .child_elements()
            .filter(|el| el.local_name() == "Override")
            .find(|el| {
                el.attr("PartName")
                    .map(|name| name.eq_ignore_ascii_case(&part_name))
                    .unwrap_or(false)
            })
            .and_then(|el| el.attr("ContentType"));
        if by_override.is_some() {
            return by_override;
        }

        let extension = part.rsplit_once('.').map(|(_, ext)| ext)?;
        self.root
            .child_elements()
            .filter(|el| el.local_name() == "Default")
            .find(|el| {
                el.attr("Extension")
                    .map(|ext| ext.eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
            })
            .and_then(|el| el.attr("ContentType"))
    }

    /// Register an `Override` for `part`, replacing an existing one
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let part_name = format!("/{}", part);
        let existing = self.root.child_elements_mut().find(|el| {
            el.local_name() == "Override" && el.attr("PartName") == Some(part_name.as_str())
        });
        if let Some(el) = existing {
            el.set_attr("ContentType", content_type);
            return;
        }

        let name = match self.root.name.split_once(':') {
            Some((prefix, _)) => xml::qualify(prefix, "Override"),
            None => "Override".to_string(),
        };
        self.root.push_child(
            Element::new(name)
                .with_attr("PartName", part_name)
                .with_attr("ContentType", content_type),
        );
    }
}
