//! Error types for reference data operations.

use thiserror::Error;

/// Common error type for reference data operations.
#[derive(Debug, Error)]
pub enum TraitError {
    /// Resource already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Source not available
    #[error("source not available: {0}")]
    SourceNotAvailable(String),

    /// Parse/deserialization error
    #[error("parse error: {0}")]
    ParseError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for TraitError {
    fn from(e: std::io::Error) -> Self {
        TraitError::IoError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gilts");
        let err = TraitError::from(io);
        assert!(matches!(err, TraitError::IoError(_)));
        assert_eq!(err.to_string(), "IO error: gilts");
    }
}
