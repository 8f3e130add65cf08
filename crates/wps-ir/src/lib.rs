#![warn(clippy::all)]

//! # wps-ir
//!
//! XML event model, element tree and traversal APIs for WPS documents.
//!
//! This crate provides the format-neutral building blocks shared by the
//! translation, adapter, model and pipeline crates: qualified names, the
//! streaming event vocabulary with its source/sink traits, the wire version
//! enum and a small element tree for binding canonical records.

/// Element tree together with the vocabulary it came from.
pub mod document;
/// Element tree used as the wire form of canonical records.
pub mod element;
/// Streaming XML events.
pub mod event;
/// Qualified names and attributes.
pub mod qname;
/// Pull/push event stream traits and in-memory implementations.
pub mod stream;
/// Tree building, emitting and cursor navigation.
pub mod traversal;
/// Wire vocabulary versions.
pub mod version;

pub use document::Document;
pub use element::Element;
pub use event::XmlEvent;
pub use qname::{Attribute, QName};
pub use stream::{EventSink, EventSource, VecSink, VecSource, pump};
pub use traversal::{Cursor, Traversal, build_tree, emit_tree, walk};
pub use version::Version;

use thiserror::Error;

/// Errors that can occur when working with the IR
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Element not found at path: {path}")]
    NotFound { path: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Mismatched end element: expected </{expected}>, found </{found}>")]
    MismatchedEnd { expected: String, found: String },

    #[error("Unexpected end element </{found}> outside of any open element")]
    UnexpectedEnd { found: String },

    #[error("Event stream ended while {open} element(s) were still open")]
    Truncated { open: usize },

    #[error("Event stream does not start with an element")]
    NoRootElement,

    #[error("Unknown wire version '{0}'")]
    UnknownVersion(String),
}

impl Error {
    /// Build a not-found error with path context.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Build an invalid-path error with input path and parsing reason.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a mismatched-end error from the open and the closing local names.
    pub fn mismatched_end(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::MismatchedEnd {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Crate-local result type for IR operations.
pub type Result<T> = std::result::Result<T, Error>;
