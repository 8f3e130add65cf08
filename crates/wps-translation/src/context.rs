//! Ancestor context for context-sensitive renames

/// Stack of the local names of the currently open elements.
///
/// Holds the names as they appear in the stream being translated (before
/// renaming), so that rule lookups stay keyed on one vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStack {
    names: Vec<String>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an element open
    pub fn push(&mut self, local: impl Into<String>) {
        self.names.push(local.into());
    }

    /// Record an element close, returning the closed name
    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    /// Name of the innermost open element, i.e. the parent of the element
    /// about to be opened
    pub fn peek_parent(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Open element names, outermost first
    pub fn path(&self) -> &[String] {
        &self.names
    }
}
