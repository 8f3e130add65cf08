#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # wps-pipeline
//!
//! Version sniffing, streaming event rewriters and the transformer facade.
//!
//! A read goes wire XML → [`wps_adapter_xml::XmlEventReader`] →
//! [`TransformingReader`] (legacy names to canonical) → binder. A write goes
//! the other way through [`TransformingWriter`]. [`LegacyTransformer`] wires
//! these together and picks the version per call.

pub mod batch;
pub mod config;
pub mod reader;
mod rewrite;
pub mod sniffer;
pub mod stats;
pub mod transformer;
pub mod writer;

pub use batch::{BatchConfig, BatchItem, BatchJob, BatchMode, BatchResult, ItemStatus, run_batch};
pub use config::TransformerConfig;
pub use reader::TransformingReader;
pub use sniffer::VersionSniffer;
pub use stats::TranslationStats;
pub use transformer::{LegacyTransformer, ReadDocument, TranslationReport};
pub use writer::TransformingWriter;

use thiserror::Error;

/// Errors that can occur in the pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("XML error: {0}")]
    Xml(#[from] wps_adapter_xml::Error),

    #[error("Binding error: {0}")]
    Model(#[from] wps_model::Error),

    #[error("Rule error: {0}")]
    Rules(#[from] wps_translation::Error),

    #[error("Document structure error: {0}")]
    Structure(#[from] wps_ir::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transform error during {operation}: {message}")]
    Transform { operation: String, message: String },

    #[error("Batch error: {0}")]
    Batch(String),

    #[error("IO error during {operation} for '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },
}

impl Error {
    /// Create a transform error with operation context.
    pub fn transform(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a structured I/O error with operation/path context.
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("io", "<unknown>", e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_preserves_operation_and_path_context() {
        let error = Error::io("open", "/tmp/input.xml", "not found");
        match error {
            Error::Io {
                operation,
                path,
                message,
            } => {
                assert_eq!(operation, "open");
                assert_eq!(path, "/tmp/input.xml");
                assert_eq!(message, "not found");
            }
            _ => panic!("expected io variant"),
        }
    }

    #[test]
    fn io_error_from_std_error_has_fallback_context() {
        let io_error = std::fs::File::open("/path/that/does/not/exist")
            .map_err(Error::from)
            .expect_err("open should fail");

        match io_error {
            Error::Io { operation, path, .. } => {
                assert_eq!(operation, "io");
                assert_eq!(path, "<unknown>");
            }
            _ => panic!("expected io variant"),
        }
    }

    #[test]
    fn lower_level_errors_convert() {
        let error: Error = wps_model::Error::UnexpectedRoot {
            found: "Foo".to_string(),
        }
        .into();
        assert!(error.to_string().contains("Foo"));
    }
}
