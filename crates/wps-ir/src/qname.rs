//! Qualified names and attributes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A namespace-qualified XML name.
///
/// Equality is structural over namespace URI and local part. The empty
/// namespace stands for "no namespace"; prefixes are a serialization detail
/// and are not part of the name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI, empty when the name is unqualified
    pub namespace: String,

    /// Local part
    pub local: String,
}

/// An attribute on a start element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: QName,

    /// Unescaped attribute value
    pub value: String,
}

impl QName {
    /// Create a qualified name
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Create a name without a namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self::new("", local)
    }

    /// Whether the name carries no namespace
    pub fn is_unqualified(&self) -> bool {
        self.namespace.is_empty()
    }
}

impl fmt::Display for QName {
    /// Clark notation: `{namespace}local`, or just `local` when unqualified.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

impl Attribute {
    /// Create an attribute
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// Create an unqualified attribute
    pub fn unqualified(local: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(QName::local(local), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = QName::new("http://www.opengis.net/wps/2.0", "Contents");
        let b = QName::new("http://www.opengis.net/wps/2.0".to_string(), "Contents");
        assert_eq!(a, b);
        assert_ne!(a, QName::new("http://www.opengis.net/wps/1.0.0", "Contents"));
        assert_ne!(a, QName::local("Contents"));
    }

    #[test]
    fn test_display_uses_clark_notation() {
        let name = QName::new("http://www.opengis.net/ows/2.0", "Title");
        assert_eq!(name.to_string(), "{http://www.opengis.net/ows/2.0}Title");
        assert_eq!(QName::local("minOccurs").to_string(), "minOccurs");
    }
}
