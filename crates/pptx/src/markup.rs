//! Minimal namespace-aware element tree for raw OOXML fragments.
//!
//! Used for paragraph property blocks (`a:pPr`) that callers edit directly
//! when the high-level text API does not cover what they need.

use mdpptx_core::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// Well-known OOXML namespace URIs.
pub mod ns {
    pub const DRAWINGML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    pub const PRESENTATIONML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    pub const RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const PACKAGE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";
    pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
}

/// Conventional prefix for a namespace inside slide parts.
fn prefix_for(namespace: &str) -> Option<&'static str> {
    match namespace {
        ns::DRAWINGML => Some("a"),
        ns::PRESENTATIONML => Some("p"),
        ns::RELATIONSHIPS => Some("r"),
        _ => None,
    }
}

/// An XML element with a resolved namespace, attributes, and child elements.
///
/// Character data is not modelled; property blocks carry none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    local: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    /// Create an element in the given namespace.
    pub fn new(namespace: &str, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            local: local.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a DrawingML (`a:`) element.
    pub fn drawing(local: impl Into<String>) -> Self {
        Self::new(ns::DRAWINGML, local)
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder form of [`Element::push`].
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Namespace URI, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local (unprefixed) name.
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Whether this element has the given namespace and local name.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace() == Some(namespace) && self.local == local
    }

    /// Attribute value by name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, key: &str) {
        self.attributes.retain(|(k, _)| k != key);
    }

    /// Child elements.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Insert a child element at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    /// Keep only the children matching the predicate.
    pub fn retain_children(&mut self, keep: impl FnMut(&Element) -> bool) {
        self.children.retain(keep);
    }

    /// Position of the first child with the given local name.
    pub fn position(&self, local: &str) -> Option<usize> {
        self.children.iter().position(|c| c.local == local)
    }

    /// First child with the given local name.
    pub fn find(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local == local)
    }

    /// Parse a single-rooted fragment. Namespace prefixes must be declared
    /// inside the fragment.
    pub fn parse(markup: &str) -> Result<Element> {
        let mut reader = NsReader::from_str(markup);
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_resolved_event() {
                Ok((resolved, Event::Start(ref e))) => {
                    stack.push(element_from(resolved, e)?);
                }
                Ok((resolved, Event::Empty(ref e))) => {
                    let element = element_from(resolved, e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok((_, Event::End(_))) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::MarkupError("Unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok((_, Event::Eof)) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(Error::MarkupError(format!("Failed to parse fragment: {}", e)));
                }
            }
        }

        if !stack.is_empty() {
            return Err(Error::MarkupError("Unclosed element in fragment".to_string()));
        }
        root.ok_or_else(|| Error::MarkupError("Empty fragment".to_string()))
    }

    /// Serialize using the conventional OOXML prefixes. The enclosing
    /// document is expected to declare them.
    pub fn write_xml(&self, out: &mut String) {
        let qualified = match self.namespace.as_deref() {
            Some(uri) => match prefix_for(uri) {
                Some(prefix) => format!("{}:{}", prefix, self.local),
                None => self.local.clone(),
            },
            None => self.local.clone(),
        };

        out.push('<');
        out.push_str(&qualified);
        if let Some(uri) = self.namespace.as_deref() {
            if prefix_for(uri).is_none() {
                out.push_str(&format!(r#" xmlns="{}""#, escape(uri)));
            }
        }
        for (key, value) in &self.attributes {
            out.push_str(&format!(r#" {}="{}""#, key, escape(value.as_str())));
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&qualified);
        out.push('>');
    }

    /// Serialize to a new string.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }
}

fn element_from(resolved: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Element> {
    let namespace = match resolved {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(Error::MarkupError(format!(
                "Undeclared namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            )));
        }
    };

    let mut element = Element {
        namespace,
        local: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes: Vec::new(),
        children: Vec::new(),
    };

    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::MarkupError(format!("Bad attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| Error::MarkupError(format!("Bad attribute value: {}", e)))?;
        element.attributes.push((key, value.into_owned()));
    }

    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::MarkupError(
            "Fragment has more than one root element".to_string(),
        )),
    }
}
