//! Streaming XML events

use crate::qname::{Attribute, QName};
use serde::{Deserialize, Serialize};

/// One event of a streaming XML document.
///
/// Namespace declarations are separate events that directly follow the
/// start element declaring them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmlEvent {
    /// Element open tag
    StartElement {
        name: QName,
        attributes: Vec<Attribute>,
    },

    /// Element close tag
    EndElement { name: QName },

    /// Namespace declaration (`xmlns` or `xmlns:prefix`)
    Namespace { prefix: Option<String>, uri: String },

    /// Character data, already unescaped
    Characters(String),

    /// Comment text
    Comment(String),
}

impl XmlEvent {
    /// Start element event
    pub fn start(name: QName, attributes: Vec<Attribute>) -> Self {
        Self::StartElement { name, attributes }
    }

    /// End element event
    pub fn end(name: QName) -> Self {
        Self::EndElement { name }
    }

    /// Namespace declaration event
    pub fn namespace(prefix: Option<&str>, uri: impl Into<String>) -> Self {
        Self::Namespace {
            prefix: prefix.map(str::to_string),
            uri: uri.into(),
        }
    }

    /// Character data event
    pub fn text(text: impl Into<String>) -> Self {
        Self::Characters(text.into())
    }

    /// Element name for start and end events
    pub fn name(&self) -> Option<&QName> {
        match self {
            Self::StartElement { name, .. } | Self::EndElement { name } => Some(name),
            _ => None,
        }
    }

    /// Attribute value on a start element, matched by local name
    pub fn attribute(&self, local: &str) -> Option<&str> {
        match self {
            Self::StartElement { attributes, .. } => attributes
                .iter()
                .find(|a| a.name.local == local)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Self::StartElement { .. })
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::EndElement { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup_by_local_name() {
        let event = XmlEvent::start(
            QName::new("urn:wps", "Capabilities"),
            vec![
                Attribute::unqualified("service", "WPS"),
                Attribute::unqualified("version", "1.0.0"),
            ],
        );

        assert_eq!(event.attribute("service"), Some("WPS"));
        assert_eq!(event.attribute("version"), Some("1.0.0"));
        assert_eq!(event.attribute("lang"), None);
        assert_eq!(event.name().map(|n| n.local.as_str()), Some("Capabilities"));
    }

    #[test]
    fn test_non_element_events_have_no_name() {
        assert!(XmlEvent::text("x").name().is_none());
        assert!(XmlEvent::namespace(Some("wps"), "urn:wps").name().is_none());
        assert!(XmlEvent::end(QName::local("a")).is_end());
        assert!(!XmlEvent::end(QName::local("a")).is_start());
    }
}
