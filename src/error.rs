//! Error types for the undocx library.

use std::io;
use thiserror::Error;

/// Result type alias for undocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], deciding how far it propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The input is not a usable package. Aborts the whole decode.
    Container,
    /// A located XML part failed to parse.
    PartParse,
    /// A single embedded resource could not be loaded.
    Resource,
    /// A relationship id has no manifest entry.
    Reference,
}

/// Errors that can occur during document decoding.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Malformed XML, with the line and column where parsing stopped.
    #[error("XML parse error at {line}:{column}: {message}")]
    XmlParse {
        line: u32,
        column: u32,
        message: String,
    },

    /// A package part could not be parsed.
    #[error("Failed to parse {part}: {message}")]
    PartParse { part: String, message: String },

    /// An archive entry exceeds the configured size cap.
    #[error("Resource {path} is {size} bytes, exceeding the {limit} byte limit")]
    ResourceTooLarge { path: String, size: u64, limit: u64 },

    /// A referenced resource was not found.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A relationship id is not present in the manifest.
    #[error("Relationship not found: {0}")]
    ReferenceNotFound(String),

    /// Error during text encoding conversion.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Wrap this error as a parse failure of the named part.
    pub fn in_part(self, part: &str) -> Self {
        match self {
            Error::PartParse { .. } => self,
            other => Error::PartParse {
                part: part.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Io(_) | Error::ZipArchive(_) | Error::MissingComponent(_) => {
                ErrorCategory::Container
            }
            Error::XmlParse { .. }
            | Error::PartParse { .. }
            | Error::Encoding(_)
            | Error::InvalidData(_) => ErrorCategory::PartParse,
            Error::ResourceTooLarge { .. } | Error::ResourceNotFound(_) => ErrorCategory::Resource,
            Error::ReferenceNotFound(_) => ErrorCategory::Reference,
        }
    }

    /// Whether this error aborts a decode wherever it is raised.
    ///
    /// Part parse errors are fatal only for the main document part; the
    /// caller decides that by where it stops propagating them.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Container
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        let pos = err.pos();
        Error::XmlParse {
            line: pos.row,
            column: pos.col,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingComponent("word/document.xml".to_string());
        assert_eq!(err.to_string(), "Missing component: word/document.xml");

        let err = Error::XmlParse {
            line: 4,
            column: 2,
            message: "unexpected end".to_string(),
        };
        assert_eq!(err.to_string(), "XML parse error at 4:2: unexpected end");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            Error::ZipArchive("bad".into()).category(),
            ErrorCategory::Container
        );
        let too_large = Error::ResourceTooLarge {
            path: "word/media/image1.png".into(),
            size: 20,
            limit: 10,
        };
        assert_eq!(too_large.category(), ErrorCategory::Resource);
        assert!(!too_large.is_fatal());
        assert_eq!(
            Error::ReferenceNotFound("rId9".into()).category(),
            ErrorCategory::Reference
        );
    }

    #[test]
    fn test_in_part_wraps_once() {
        let err = Error::XmlParse {
            line: 1,
            column: 3,
            message: "bad".into(),
        }
        .in_part("word/numbering.xml");
        assert_eq!(err.category(), ErrorCategory::PartParse);
        let again = err.in_part("other.xml");
        assert!(again.to_string().contains("word/numbering.xml"));
    }
}
