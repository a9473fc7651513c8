//! Error types for the PDF concatenator library

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF concatenator library
#[derive(Error, Debug)]
pub enum Error {
    /// Concatenation was requested with no source files
    #[error("No input files provided")]
    EmptyInput,

    /// A source document could not be opened; aborts the whole operation
    #[error("Cannot open {}: {}", .path.display(), .fault)]
    SourceOpen { path: PathBuf, fault: SourceFault },

    /// The destination could not be created or written
    #[error("Cannot write {}: {}", .path.display(), .source)]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The background concatenation thread panicked
    #[error("Concatenation worker stopped unexpectedly")]
    WorkerPanicked,

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn source_open(path: impl Into<PathBuf>, fault: SourceFault) -> Self {
        Error::SourceOpen {
            path: path.into(),
            fault,
        }
    }

    pub(crate) fn output_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::OutputWrite {
            path: path.into(),
            source,
        }
    }
}

/// Why a source document could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFault {
    /// The path does not exist
    NotFound,
    /// The process may not read the file
    PermissionDenied,
    /// The document is encrypted
    Encrypted,
    /// The document has an empty page tree
    NoPages,
    /// The file is not a readable PDF
    Malformed(String),
}

impl SourceFault {
    /// Classify an I/O error raised while opening a source
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SourceFault::NotFound,
            io::ErrorKind::PermissionDenied => SourceFault::PermissionDenied,
            _ => SourceFault::Malformed(err.to_string()),
        }
    }

    /// Classify a parser error raised while loading a source
    pub fn from_pdf(err: &lopdf::Error) -> Self {
        SourceFault::Malformed(err.to_string())
    }
}

impl fmt::Display for SourceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFault::NotFound => f.write_str("file not found"),
            SourceFault::PermissionDenied => f.write_str("permission denied"),
            SourceFault::Encrypted => f.write_str("document is encrypted"),
            SourceFault::NoPages => f.write_str("document has no pages"),
            SourceFault::Malformed(reason) => write!(f, "not a valid PDF ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_open_message_names_path_and_fault() {
        let err = Error::source_open("missing.pdf", SourceFault::NotFound);
        assert_eq!(err.to_string(), "Cannot open missing.pdf: file not found");
    }

    #[test]
    fn test_fault_from_io_kind() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(SourceFault::from_io(&denied), SourceFault::PermissionDenied);

        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(SourceFault::from_io(&missing), SourceFault::NotFound);

        let other = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        assert!(matches!(SourceFault::from_io(&other), SourceFault::Malformed(_)));
    }

    #[test]
    fn test_empty_input_message() {
        assert_eq!(Error::EmptyInput.to_string(), "No input files provided");
    }
}
