//! Element tree built from an event stream

use crate::qname::{Attribute, QName};
use serde::{Deserialize, Serialize};

/// An element in the wire tree
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    /// Element name
    pub name: QName,

    /// Attributes in document order
    pub attributes: Vec<Attribute>,

    /// Namespace declarations made on this element (prefix, URI)
    pub namespaces: Vec<(Option<String>, String)>,

    /// Concatenated character data directly inside this element
    pub text: Option<String>,

    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(name: QName) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Create an element holding only text
    pub fn with_text(name: QName, text: impl Into<String>) -> Self {
        Self {
            name,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Add a text child when `text` is present
    pub fn add_text_child(&mut self, name: QName, text: Option<&str>) -> &mut Self {
        if let Some(text) = text {
            self.children.push(Element::with_text(name, text));
        }
        self
    }

    /// Set an attribute, replacing an existing one with the same name
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
        self
    }

    /// Declare a namespace on this element
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: impl Into<String>) -> &mut Self {
        self.namespaces.push((prefix.map(str::to_string), uri.into()));
        self
    }

    /// Attribute value by local name, whatever its namespace
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Trimmed text content, `None` when empty
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Find the first child by local name
    pub fn find_child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name.local == local)
    }

    /// Find all children by local name
    pub fn find_children<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name.local == local)
    }

    /// Text of the first child with the given local name
    pub fn child_text(&self, local: &str) -> Option<&str> {
        self.find_child(local).and_then(Element::text)
    }

    /// Number of elements in this subtree, this one included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Element::count).sum::<usize>()
    }
}
