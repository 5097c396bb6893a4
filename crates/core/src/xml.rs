//! Minimal owned element tree over quick-xml
//!
//! The game's config files are small enough to be fully materialized, so
//! documents are read into an [`XmlElement`] tree and written back from one.
//! Text nodes, comments and processing instructions are dropped.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{ConfigError, ConfigResult};

/// UTF-8 byte-order mark. The game refuses files that start with it.
const UTF8_BOM: char = '\u{feff}';

/// An element with its attributes (in source order) and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute append
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_attr(key, value);
        self
    }

    pub fn push_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((key.into(), value.into()));
    }

    /// Value of the first attribute named `key`
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements named `name`, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn from_start(start: &BytesStart<'_>) -> ConfigResult<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }
}

/// Parse a document and return its root element
///
/// A leading byte-order mark is tolerated on input even though it is never
/// written back.
pub fn parse_document(text: &str) -> ConfigResult<XmlElement> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(XmlElement::from_start(&start)?),
            Event::Empty(start) => {
                let element = XmlElement::from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or(ConfigError::MissingRoot)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        // Only the first top-level element counts as the root
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Serialize a document: `<?xml version="1.0" encoding="utf-8"?>`, then the
/// root indented by `indent` spaces per level, UTF-8 without a byte-order mark.
pub fn write_document(root: &XmlElement, indent: usize) -> ConfigResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', indent);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> ConfigResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            write_element(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    }
    Ok(())
}
