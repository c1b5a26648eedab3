//! Error Types
//!
//! Distinct failure kinds for loading and querying word-vector models.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by model loading and similarity queries
#[derive(Error, Debug)]
pub enum Error {
    /// An explicit kind or argument the caller passed is not accepted
    #[error("{0}")]
    InvalidArgument(String),

    /// Automatic detection could not map the path to a format
    #[error("Could not identify kind of '{}'", path.display())]
    FormatUnknown { path: PathBuf },

    /// Header or record is malformed or truncated
    #[error("Corrupt vector file: {detail}")]
    CorruptFile { detail: String },

    /// Lookup referenced a word absent from the vocabulary
    #[error("Word not found in vocabulary: '{0}'")]
    WordNotFound(String),

    /// Query vector length differs from the model dimensions
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Operation exists in the API but is not supported
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// Underlying file system failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn corrupt(detail: impl Into<String>) -> Self {
        Error::CorruptFile {
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid(detail: impl Into<String>) -> Self {
        Error::InvalidArgument(detail.into())
    }

    /// Map a read failure inside a record to a corruption error when the
    /// stream simply ended early.
    pub(crate) fn from_read(err: io::Error, what: impl FnOnce() -> String) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::corrupt(format!("unexpected end of file while reading {}", what()))
        } else {
            Error::Io(err)
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "INVALID_ARGUMENT",
            Error::FormatUnknown { .. } => "FORMAT_UNKNOWN",
            Error::CorruptFile { .. } => "CORRUPT_FILE",
            Error::WordNotFound(_) => "WORD_NOT_FOUND",
            Error::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Error::NotImplemented(_) => "NOT_IMPLEMENTED",
            Error::Io(_) => "IO",
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_distinguish_kinds() {
        let invalid = Error::invalid("analogy needs at least one word");
        assert_eq!(invalid.to_string(), "analogy needs at least one word");

        let unknown = Error::FormatUnknown {
            path: PathBuf::from("vectors.unknown"),
        };
        assert!(unknown.to_string().starts_with("Could not identify kind"));
        assert_ne!(invalid.kind(), unknown.kind());
    }

    #[test]
    fn test_eof_maps_to_corrupt() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err = Error::from_read(eof, || "vector".to_string());
        assert!(matches!(err, Error::CorruptFile { .. }));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from_read(denied, || "vector".to_string());
        assert!(matches!(err, Error::Io(_)));
    }
}
