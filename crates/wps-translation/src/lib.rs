//! # wps-translation
//!
//! Rename rules, namespace map and context stack for translating between the
//! WPS 1.0.0 ("legacy") and WPS 2.0 ("current") XML vocabularies.
//!
//! The rule list is authored once, in the Current → Legacy direction, and the
//! Legacy → Current table is derived from it mechanically. Lookups never
//! fail: a name no rule covers passes through unchanged.

pub mod context;
pub mod namespace;
pub mod rules;
pub mod table;

pub use context::ContextStack;
pub use namespace::NamespaceMap;
pub use rules::{Disambiguation, NamespacePair, RuleSet, TranslationRule};
pub use table::{Direction, TranslationTable};

use thiserror::Error;

/// Errors that can occur while building translation tables
#[derive(Error, Debug)]
pub enum Error {
    #[error("Rule file parse error: {0}")]
    Parse(String),

    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Conflicting {direction} rules for '{key}': '{existing}' vs '{new}'")]
    Conflict {
        direction: Direction,
        key: String,
        existing: String,
        new: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an invalid-rule error
    pub fn invalid_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
