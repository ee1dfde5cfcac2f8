//! XML document handling
//!
//! This module parses raw CFDI bytes into a navigable, namespace-aware
//! element tree, evaluates path-table selectors against it, and owns the
//! canonicalization routine used both at load time and at re-serialization.

use crate::error::{Error, Result};
use crate::namespaces::{NamespaceSet, QName};
use crate::paths::{Axis, Selector};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

/// The normalized XML declaration emitted by [`canonicalize`]
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Whitespace-only runs between a closing and an opening angle bracket
static INTER_TAG_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").unwrap());

/// XML element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name as written in the document
    pub name: QName,
    /// Element attributes in document order (namespace declarations excluded)
    pub attributes: IndexMap<String, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// Get the namespace prefix of the element
    pub fn prefix(&self) -> Option<&str> {
        self.name.prefix.as_deref()
    }

    /// Get an attribute value by its literal name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Whether this element carries an attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    fn matches(&self, prefix: Option<&str>, local: &str) -> bool {
        self.prefix() == prefix && self.name.local == local
    }

    /// Collect matching descendants in document order
    fn descendants_matching<'a>(
        &'a self,
        prefix: Option<&str>,
        local: &str,
        include_self: bool,
        out: &mut Vec<&'a Element>,
    ) {
        if include_self && self.matches(prefix, local) {
            out.push(self);
        }
        for child in &self.children {
            child.descendants_matching(prefix, local, true, out);
        }
    }
}

/// A parsed, queryable CFDI document
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
    namespaces: NamespaceSet,
}

impl Document {
    /// Parse an XML document from a string
    ///
    /// Fails with [`Error::MalformedXml`] when the input is not parseable
    /// XML or has no root element. Namespace declarations are harvested from
    /// the whole tree while building it.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.trim_text(true);

        let mut namespaces = NamespaceSet::new();
        let mut element_stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let element = Self::parse_element(&e, &mut namespaces)?;
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.children.push(current);
                        } else if root.is_none() {
                            root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::parse_element(&e, &mut namespaces)?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.children.push(element);
                    } else if root.is_none() {
                        root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| {
                                Error::MalformedXml(format!("failed to unescape text: {}", e))
                            })?
                            .to_string();
                        if !text.trim().is_empty() {
                            current.text = Some(text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::MalformedXml(format!(
                        "error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Ignore comments, processing instructions, etc.
            }
            buf.clear();
        }

        let root = root.ok_or_else(|| Error::MalformedXml("no root element".to_string()))?;

        Ok(Self { root, namespaces })
    }

    /// Parse an element from a BytesStart event, recording any namespace
    /// declarations it carries
    fn parse_element(start: &BytesStart, namespaces: &mut NamespaceSet) -> Result<Element> {
        let name_bytes = start.name();
        let name = std::str::from_utf8(name_bytes.as_ref())
            .map_err(|e| Error::MalformedXml(format!("invalid element name: {}", e)))?;

        let mut element = Element::new(QName::parse(name));

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::MalformedXml(format!("failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::MalformedXml(format!("invalid attribute name: {}", e)))?;

            let attr_value = attr
                .unescape_value()
                .map_err(|e| {
                    Error::MalformedXml(format!("failed to unescape attribute value: {}", e))
                })?
                .to_string();

            if attr_name == "xmlns" {
                namespaces.set_default_namespace(&attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                namespaces.add_prefix(prefix, &attr_value);
            } else {
                element.attributes.insert(attr_name.to_string(), attr_value);
            }
        }

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The namespace declarations discovered in the tree
    pub fn namespaces(&self) -> &NamespaceSet {
        &self.namespaces
    }

    /// The namespace prefixes declared anywhere in the tree, in sorted order
    pub fn declared_prefixes(&self) -> impl Iterator<Item = &str> {
        self.namespaces.prefixes()
    }

    /// Evaluate a path-table selector against the tree
    ///
    /// Returns every matching element in document order; zero matches is not
    /// an error. The first step's context is the document itself, so a
    /// descendant step can match the root element.
    pub fn select<'a>(&'a self, selector: &Selector) -> Vec<&'a Element> {
        let mut context: Vec<&Element> = Vec::new();

        for (i, step) in selector.steps().iter().enumerate() {
            let mut next: Vec<&Element> = Vec::new();
            let prefix = step.prefix.as_deref();

            if i == 0 {
                match step.axis {
                    Axis::Descendant => {
                        self.root
                            .descendants_matching(prefix, &step.local, true, &mut next)
                    }
                    Axis::Child => {
                        if self.root.matches(prefix, &step.local) {
                            next.push(&self.root);
                        }
                    }
                }
            } else {
                for node in &context {
                    match step.axis {
                        Axis::Descendant => {
                            for child in &node.children {
                                child.descendants_matching(prefix, &step.local, true, &mut next);
                            }
                        }
                        Axis::Child => {
                            for child in &node.children {
                                if child.matches(prefix, &step.local) {
                                    next.push(child);
                                }
                            }
                        }
                    }
                }
            }

            context = next;
            if context.is_empty() {
                break;
            }
        }

        context
    }
}

/// Canonicalize an XML text
///
/// Deterministic transform applied in order: strip a literal
/// `<?xml version="1.0" encoding="UTF-8"?>` at the very start, remove every
/// line-feed and carriage-return character, remove whitespace-only runs
/// between tags (whitespace inside a leaf element's text content is
/// preserved), then re-prepend the normalized declaration followed by one
/// newline. Idempotent, so output is stable regardless of the original
/// document's indentation.
pub fn canonicalize(xml: &str) -> String {
    let body = xml.strip_prefix(XML_DECLARATION).unwrap_or(xml);
    let body: String = body.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let body = INTER_TAG_WHITESPACE.replace_all(&body, "><");
    format!("{}\n{}", XML_DECLARATION, body.trim())
}
