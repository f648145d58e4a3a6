//! Owned XML element tree for package parts
//!
//! Parts are small enough to hold fully in memory, so every part we touch is
//! parsed into an [`Element`] tree, edited, and written back. Content we don't
//! understand (unknown elements, attributes, comments) is kept as-is so the
//! rest of the part survives the round trip.

use std::io::Cursor;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use crate::error::{Error, Result};

/// A child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An XML element with its qualified name, ordered attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Build a qualified name, leaving the prefix off for the default namespace
pub fn qualify(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Local part of the element name (after the prefix)
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.name == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|el| el.name == name)
    }

    /// Index into `children` of the first element child with this name
    pub fn child_position(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(el) if el.name == name))
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn insert_child(&mut self, index: usize, child: Element) {
        self.children.insert(index, Node::Element(child));
    }

    /// First child element named `name`, created at `index` when missing
    ///
    /// `index` is clamped to the number of children, so `usize::MAX` appends.
    pub fn ensure_child(&mut self, name: &str, index: usize) -> &mut Element {
        let position = match self.child_position(name) {
            Some(position) => position,
            None => {
                let index = index.min(self.children.len());
                self.insert_child(index, Element::new(name));
                index
            }
        };
        match &mut self.children[position] {
            Node::Element(el) => el,
            _ => unreachable!("child_position only reports element nodes"),
        }
    }

    /// All descendant elements with the given name, in document order
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_named(self, name, &mut found);
        found
    }

    /// Concatenated text content of this element and its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => out.push_str(&el.text()),
                Node::Comment(_) => {}
            }
        }
        out
    }

    /// Prefix bound to `uri` by a declaration on this element
    ///
    /// The default namespace is reported as an empty prefix.
    pub fn namespace_prefix(&self, uri: &str) -> Option<&str> {
        self.attributes.iter().find_map(|(key, value)| {
            if value != uri {
                return None;
            }
            if key == "xmlns" {
                Some("")
            } else {
                key.strip_prefix("xmlns:")
            }
        })
    }

    /// Prefix in scope for `uri` at the last element of `path`
    ///
    /// `path` runs from the root down to the element; the innermost
    /// declaration wins, and a prefix rebound to another URI further down
    /// is no longer in scope.
    pub fn lookup_prefix<'a>(path: &[&'a Element], uri: &str) -> Option<&'a str> {
        for (depth, &el) in path.iter().enumerate().rev() {
            let Some(prefix) = el.namespace_prefix(uri) else {
                continue;
            };
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            let shadowed = path[depth + 1..]
                .iter()
                .any(|inner| inner.attr(&key).map(|bound| bound != uri).unwrap_or(false));
            if !shadowed {
                return Some(prefix);
            }
        }
        None
    }

    /// Make sure `uri` is declared on this element and return its prefix
    ///
    /// An existing binding wins. Otherwise `preferred` is declared, with a
    /// numeric suffix if that prefix is already bound to something else.
    pub fn declare_namespace(&mut self, preferred: &str, uri: &str) -> String {
        if let Some(prefix) = self.namespace_prefix(uri) {
            return prefix.to_string();
        }
        let mut prefix = preferred.to_string();
        let mut n = 1;
        while self.attr(&format!("xmlns:{}", prefix)).is_some() {
            prefix = format!("{}{}", preferred, n);
            n += 1;
        }
        self.set_attr(format!("xmlns:{}", prefix), uri);
        prefix
    }
}

fn collect_named<'a>(el: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    for child in el.child_elements() {
        if child.name == name {
            found.push(child);
        }
        collect_named(child, name, found);
    }
}

fn element_from_start(start: &BytesStart, part: &str) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| invalid(part, format!("element name is not UTF-8: {}", e)))?
        .to_string();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| invalid(part, e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| invalid(part, format!("attribute name is not UTF-8: {}", e)))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| invalid(part, e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn invalid(part: &str, reason: String) -> Error {
    Error::InvalidXml {
        part: part.to_string(),
        reason,
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element, part: &str) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_child(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(invalid(part, "more than one root element".to_string())),
    }
}

/// Parse a part into its root element
///
/// `part` names the part in error messages.
pub fn parse(xml: &[u8], part: &str) -> Result<Element> {
    let mut reader = Reader::from_reader(Cursor::new(xml));
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(element_from_start(&e, part)?);
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| invalid(part, "unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element, part)?;
            }
            Ok(Event::Empty(e)) => {
                let element = element_from_start(&e, part)?;
                attach(&mut stack, &mut root, element, part)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| invalid(part, e.to_string()))?;
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = e.into_inner();
                    parent
                        .children
                        .push(Node::Text(String::from_utf8_lossy(raw.as_ref()).into_owned()));
                }
            }
            Ok(Event::Comment(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = e.into_inner();
                    parent
                        .children
                        .push(Node::Comment(String::from_utf8_lossy(raw.as_ref()).into_owned()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(invalid(
                    part,
                    format!("{} at byte {}", err, reader.buffer_position()),
                ));
            }
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(invalid(part, "unexpected end of document".to_string()));
    }
    root.ok_or_else(|| invalid(part, "no root element".to_string()))
}

/// Serialize a root element as a standalone part
pub fn serialize(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Text(BytesText::from_escaped("\r\n")))?;
    write_element(&mut writer, root)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in &element.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            Node::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
