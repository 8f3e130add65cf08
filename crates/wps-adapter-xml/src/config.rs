//! XML reading and writing options

use serde::{Deserialize, Serialize};

/// Configuration for XML reading and writing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlConfig {
    /// Indentation width in spaces for written documents (default: 2, `None` writes compactly)
    pub indent: Option<usize>,
    /// Whether to write an XML declaration (default: true)
    pub write_declaration: bool,
    /// Whether to drop whitespace-only text when reading (default: true)
    pub trim_text: bool,
    /// Whether comments inside the root element are reported (default: false)
    pub preserve_comments: bool,
    /// Preferred prefixes for namespaces the writer has to declare itself
    pub prefixes: Vec<PrefixBinding>,
}

/// Preferred prefix for a namespace URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixBinding {
    pub uri: String,
    pub prefix: String,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            indent: Some(2),
            write_declaration: true,
            trim_text: true,
            preserve_comments: false,
            prefixes: Vec::new(),
        }
    }
}

impl XmlConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set indentation width
    pub fn indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    /// Write without indentation
    pub fn compact(mut self) -> Self {
        self.indent = None;
        self
    }

    /// Configure XML declaration output
    pub fn write_declaration(mut self, write: bool) -> Self {
        self.write_declaration = write;
        self
    }

    /// Configure whitespace trimming on read
    pub fn trim_text(mut self, trim: bool) -> Self {
        self.trim_text = trim;
        self
    }

    /// Configure comment reporting on read
    pub fn preserve_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }

    /// Add a preferred prefix for `uri`
    pub fn prefix(mut self, uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.prefixes.push(PrefixBinding {
            uri: uri.into(),
            prefix: prefix.into(),
        });
        self
    }

    /// Preferred prefix for `uri`, if configured
    pub fn preferred_prefix(&self, uri: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|b| b.uri == uri)
            .map(|b| b.prefix.as_str())
    }
}
