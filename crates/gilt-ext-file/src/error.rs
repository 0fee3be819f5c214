//! Errors raised while reading gilt workbooks.

use std::path::PathBuf;

use thiserror::Error;

use gilt_traits::TraitError;

/// Result alias for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur while locating or parsing workbooks.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The workbook could not be opened or read.
    #[error("failed to read workbook {path}: {source}")]
    Workbook {
        /// Workbook path.
        path: PathBuf,
        /// Underlying reader error.
        #[source]
        source: calamine::XlsError,
    },

    /// The workbook has no worksheets.
    #[error("workbook {0} has no worksheets")]
    NoWorksheet(PathBuf),

    /// Cell A1 does not carry a `Data Date: DD-Mon-YYYY` stamp.
    #[error("could not find data date in first cell: {0:?}")]
    MissingDataDate(String),

    /// A required column is absent from the header row.
    #[error("missing required column '{0}' in worksheet header")]
    MissingColumn(String),

    /// The gilts directory does not exist.
    #[error("gilts directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    /// No matching workbook was found.
    #[error("no gilt workbook found under {0}")]
    NoWorkbooks(PathBuf),

    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<IngestError> for TraitError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::MissingDirectory(_) | IngestError::NoWorkbooks(_) => {
                TraitError::SourceNotAvailable(e.to_string())
            }
            IngestError::Io(io) => TraitError::from(io),
            other => TraitError::ParseError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_error_mapping() {
        let err: TraitError = IngestError::NoWorkbooks(PathBuf::from("gilts")).into();
        assert!(matches!(err, TraitError::SourceNotAvailable(_)));

        let err: TraitError = IngestError::MissingColumn("ISIN Code".to_string()).into();
        assert!(matches!(err, TraitError::ParseError(msg) if msg.contains("ISIN Code")));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TraitError = IngestError::from(io).into();
        assert!(matches!(err, TraitError::IoError(_)));
    }
}
