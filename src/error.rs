//! Error types for docweave.

use std::io;
use thiserror::Error;

/// Result type alias for docweave operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document conversion.
///
/// The `Display` output carries the full diagnostic and is meant for logs.
/// Use [`Error::public_message`] for anything shown to an untrusted caller.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller supplied input that is rejected before any processing
    /// (disallowed extension, missing field, oversized payload).
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// The markup could not be turned into a tree.
    #[error("Markup parse error: {0}")]
    Parse(String),

    /// A package could not be read or converted (corrupt package,
    /// structural backend failure).
    #[error("Package conversion error: {0}")]
    Conversion(String),

    /// The package serializer rejected the structured document.
    #[error("Package build error: {0}")]
    Build(String),

    /// An exporter failed to render or write its output.
    #[error("Export error: {0}")]
    Export(String),

    /// Temporary resource allocation or release failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Fieldless classification of [`Error`], stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::InputValidation`].
    InputValidation,
    /// See [`Error::Parse`].
    Parse,
    /// See [`Error::Conversion`].
    Conversion,
    /// See [`Error::Build`].
    Build,
    /// See [`Error::Export`].
    Export,
    /// See [`Error::Io`].
    Io,
}

impl ErrorKind {
    /// Numeric code for transport layers that cannot carry the enum.
    pub fn code(self) -> u32 {
        match self {
            ErrorKind::InputValidation => 1,
            ErrorKind::Parse => 2,
            ErrorKind::Conversion => 3,
            ErrorKind::Build => 4,
            ErrorKind::Export => 5,
            ErrorKind::Io => 99,
        }
    }
}

impl Error {
    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InputValidation(_) => ErrorKind::InputValidation,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Conversion(_) => ErrorKind::Conversion,
            Error::Build(_) => ErrorKind::Build,
            Error::Export(_) => ErrorKind::Export,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// A message that is safe to hand back to an untrusted caller.
    ///
    /// Validation messages only describe the caller's own input and are
    /// passed through; all other kinds map to a fixed sentence.
    pub fn public_message(&self) -> String {
        match self {
            Error::InputValidation(msg) => msg.clone(),
            Error::Parse(_) => "The markup could not be parsed.".to_string(),
            Error::Conversion(_) => "The document could not be converted.".to_string(),
            Error::Build(_) => "The Word document could not be generated.".to_string(),
            Error::Export(_) => "The export could not be produced.".to_string(),
            Error::Io(_) => "A temporary storage error occurred.".to_string(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Conversion(format!("ZIP container: {}", err))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Conversion(format!("XML: {}", err))
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Export(format!("PDF: {}", err))
    }
}
