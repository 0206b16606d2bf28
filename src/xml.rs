//! In-memory XML trees and the node queries the extractors are written against.
//!
//! Documents are small (a single device's metadata) so they are read fully
//! into an [`Element`] tree with quick-xml. Extractors only see the
//! [`XmlNode`] capability trait, never the tree type itself.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::escape::{escape, partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{ProfilerError, Result};

/// What an extractor needs from a parsed element.
pub trait XmlNode: Sized {
    /// Qualified tag name, prefix included (`cache:text`).
    fn name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Immediate element children in document order; text is skipped.
    fn element_children(&self) -> impl Iterator<Item = &Self>;

    /// Serialized form of the first child node, whatever its kind.
    fn first_child_xml(&self) -> Option<String>;

    /// First element named `name` in document order below this node.
    fn find_descendant(&self, name: &str) -> Option<&Self> {
        for child in self.element_children() {
            if child.name() == name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(name) {
                return Some(found);
            }
        }
        None
    }
}

/// Returns all of `names` in order, or `None` if any one is missing.
pub fn validate_attributes<'a, N: XmlNode>(node: &'a N, names: &[&str]) -> Option<Vec<&'a str>> {
    names.iter().map(|name| node.attribute(name)).collect()
}

pub fn first_named_child<'a, N: XmlNode>(node: &'a N, name: &str) -> Option<&'a N> {
    node.element_children().find(|child| child.name() == name)
}

/// Serialized first child of the named child, or `""` when there is no such
/// child or it is empty.
pub fn text_of_named_child<N: XmlNode>(node: &N, name: &str) -> String {
    first_named_child(node, name)
        .and_then(|child| child.first_child_xml())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
}

impl Node {
    fn write_xml(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write_xml(out),
            Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
            Node::CData(text) => out.push_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.push_text(text.as_ref());
        self
    }

    fn from_start(start: &BytesStart<'_>) -> std::result::Result<Self, String> {
        let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(|e| e.to_string())?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    /// Adjacent text runs (split around entity references) are merged.
    fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape(value.as_str()));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write_xml(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

impl XmlNode for Element {
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn element_children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    fn first_child_xml(&self) -> Option<String> {
        self.children.first().map(|child| {
            let mut out = String::new();
            child.write_xml(&mut out);
            out
        })
    }
}

/// A fully parsed document.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    root: Element,
}

impl Document {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content).map_err(|e| match e {
            ProfilerError::Xml { details, .. } => ProfilerError::Xml {
                file: path.to_path_buf(),
                details,
            },
            other => other,
        })
        .map(|mut document| {
            document.path = path.to_path_buf();
            document
        })
    }

    pub fn parse_str(content: &str) -> Result<Self> {
        let root = build_tree(strip_bom(content)).map_err(|details| ProfilerError::Xml {
            file: PathBuf::new(),
            details,
        })?;
        Ok(Self {
            path: PathBuf::new(),
            root,
        })
    }

    /// File the document was read from; empty for in-memory documents.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// First element named `name` in document order, the root included.
    pub fn find_element(&self, name: &str) -> Option<&Element> {
        if self.root.name == name {
            Some(&self.root)
        } else {
            self.root.find_descendant(name)
        }
    }

    /// Like [`Document::find_element`], failing with a structural error.
    pub fn require_element(&self, name: &str) -> Result<&Element> {
        self.find_element(name)
            .ok_or_else(|| ProfilerError::structural(&self.path, name))
    }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

fn build_tree(content: &str) -> std::result::Result<Element, String> {
    let mut reader = Reader::from_str(content);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element::from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let element = Element::from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    let resolved = resolve_entity(&entity)
                        .ok_or_else(|| format!("unknown entity &{};", entity))?;
                    parent.push_text(&resolved);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    parent.children.push(Node::CData(text));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "{} at byte {}",
                    e,
                    reader.error_position()
                ));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("second root element <{}>", element.name)),
    }
    Ok(())
}

fn resolve_entity(entity: &str) -> Option<Cow<'static, str>> {
    let named = match entity {
        "apos" => Some("'"),
        "quot" => Some("\""),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        _ => None,
    };
    if let Some(text) = named {
        return Some(Cow::Borrowed(text));
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse().ok()?
    };
    char::from_u32(code).map(|c| Cow::Owned(c.to_string()))
}
