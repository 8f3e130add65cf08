//! Document container

use crate::element::Element;
use crate::version::Version;
use serde::{Deserialize, Serialize};

/// A whole document in tree form together with the vocabulary it uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Root element
    pub root: Element,

    /// Vocabulary the document was read in or is to be written in
    pub version: Version,

    /// Source file path or identifier
    pub source: Option<String>,
}

impl Document {
    /// Create a new document with the given root element
    pub fn new(root: Element, version: Version) -> Self {
        Self {
            root,
            version,
            source: None,
        }
    }

    /// Set the source reference
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Local name of the root element
    pub fn root_name(&self) -> &str {
        &self.root.name.local
    }
}
