//! Error types for the XML adapter with context

use thiserror::Error;

/// Errors that can occur when reading or writing XML
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// Malformed input with byte position
    #[error("XML read error at byte {position}: {message}")]
    Read { position: u64, message: String },

    /// Underlying writer failure
    #[error("XML write error: {0}")]
    Write(String),

    /// Prefix used without a namespace declaration
    #[error("Unbound namespace prefix '{prefix}' at byte {position}")]
    UnboundPrefix { prefix: String, position: u64 },

    /// Input bytes that are not UTF-8
    #[error("Invalid UTF-8 in {context} at byte {position}")]
    Encoding { context: String, position: u64 },

    /// Event sequence is not a well-formed element tree
    #[error("Structure error: {0}")]
    Structure(#[from] wps_ir::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(String),
}

impl XmlError {
    /// Create a read error at a byte position
    pub fn read_at(position: u64, message: impl Into<String>) -> Self {
        Self::Read {
            position,
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// Create an encoding error
    pub fn encoding(context: impl Into<String>, position: u64) -> Self {
        Self::Encoding {
            context: context.into(),
            position,
        }
    }

    /// Byte position for read-side errors
    pub fn position(&self) -> Option<u64> {
        match self {
            Self::Read { position, .. }
            | Self::UnboundPrefix { position, .. }
            | Self::Encoding { position, .. } => Some(*position),
            _ => None,
        }
    }
}

impl From<std::io::Error> for XmlError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result type for XML adapter operations
pub type XmlResult<T> = Result<T, XmlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_display_has_position() {
        let error = XmlError::read_at(42, "unexpected end of document");
        assert_eq!(
            error.to_string(),
            "XML read error at byte 42: unexpected end of document"
        );
        assert_eq!(error.position(), Some(42));
    }

    #[test]
    fn test_structure_error_from_ir() {
        let error: XmlError = wps_ir::Error::mismatched_end("a", "b").into();
        assert!(matches!(error, XmlError::Structure(_)));
        assert_eq!(error.position(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let error = XmlError::from(io);
        assert_eq!(error, XmlError::Io("pipe closed".to_string()));
    }
}
