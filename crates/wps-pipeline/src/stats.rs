//! Per-rewriter translation counters

use serde::Serialize;
use std::ops::AddAssign;

/// Statistics for one pass of a stream rewriter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TranslationStats {
    /// Events that went through the rewriter
    pub events: usize,
    /// Element names whose namespace or local part changed
    pub elements_renamed: usize,
    /// Attribute names whose namespace changed
    pub attributes_renamed: usize,
    /// Namespace declarations whose URI changed
    pub namespaces_renamed: usize,
}

impl TranslationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of names the pass changed
    pub fn renamed(&self) -> usize {
        self.elements_renamed + self.attributes_renamed + self.namespaces_renamed
    }

    /// Whether the pass left every event untouched
    pub fn is_identity(&self) -> bool {
        self.renamed() == 0
    }
}

impl AddAssign for TranslationStats {
    fn add_assign(&mut self, other: Self) {
        self.events += other.events;
        self.elements_renamed += other.elements_renamed;
        self.attributes_renamed += other.attributes_renamed;
        self.namespaces_renamed += other.namespaces_renamed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate() {
        let mut total = TranslationStats::new();
        assert!(total.is_identity());

        total += TranslationStats {
            events: 10,
            elements_renamed: 2,
            attributes_renamed: 1,
            namespaces_renamed: 0,
        };
        total += TranslationStats {
            events: 4,
            namespaces_renamed: 2,
            ..Default::default()
        };

        assert_eq!(total.events, 14);
        assert_eq!(total.renamed(), 5);
        assert!(!total.is_identity());
    }
}
