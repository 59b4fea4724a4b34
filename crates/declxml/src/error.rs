//! Error types for processing XML documents.

use std::fmt;
use thiserror::Error;

/// Result type alias for declxml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type accepted from hook callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The kinds of errors raised by the processing engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The processor cannot act as the root of a document.
    InvalidRootProcessor,
    /// A required value was absent.
    MissingValue,
    /// Raw text could not be converted into the primitive type.
    InvalidPrimitiveValue,
    /// A value did not have the shape the processor expects.
    Conversion,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidRootProcessor => "invalid root processor",
            ErrorKind::MissingValue => "missing value",
            ErrorKind::InvalidPrimitiveValue => "invalid primitive value",
            ErrorKind::Conversion => "conversion error",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while parsing or serializing.
///
/// Messages raised during traversal end with the location of the failure,
/// e.g. `Missing required element: "year" at authors/author[1]/year`.
#[derive(Debug, Error)]
pub enum Error {
    /// The supplied processor cannot be used as the document root.
    #[error("{0}")]
    InvalidRootProcessor(String),

    /// A required element, attribute, or value was absent.
    #[error("{0}")]
    MissingValue(String),

    /// Text could not be converted to the primitive type.
    #[error("{0}")]
    InvalidPrimitiveValue(String),

    /// A value could not be converted to or from its structured form.
    #[error("{0}")]
    Conversion(String),

    /// An error supplied by a hook callback.
    #[error("{message}")]
    Custom {
        message: String,
        #[source]
        source: BoxError,
    },

    /// The document could not be read or rendered.
    #[error("XML error: {0}")]
    Xml(#[from] declxml_tree::Error),

    /// File access failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an engine error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::InvalidRootProcessor => Error::InvalidRootProcessor(message),
            ErrorKind::MissingValue => Error::MissingValue(message),
            ErrorKind::InvalidPrimitiveValue => Error::InvalidPrimitiveValue(message),
            ErrorKind::Conversion => Error::Conversion(message),
        }
    }

    /// Wrap an error raised by a hook.
    ///
    /// The error's own message is kept as-is and the error remains
    /// reachable through [`std::error::Error::source`].
    pub fn custom(err: impl Into<BoxError>) -> Self {
        let source = err.into();
        Error::Custom {
            message: source.to_string(),
            source,
        }
    }

    /// The engine error kind, if this error was raised by the engine.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::InvalidRootProcessor(_) => Some(ErrorKind::InvalidRootProcessor),
            Error::MissingValue(_) => Some(ErrorKind::MissingValue),
            Error::InvalidPrimitiveValue(_) => Some(ErrorKind::InvalidPrimitiveValue),
            Error::Conversion(_) => Some(ErrorKind::Conversion),
            Error::Custom { .. } | Error::Xml(_) | Error::Io(_) => None,
        }
    }

    /// Downcast the source of a hook error to a concrete type.
    pub fn downcast_custom<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Custom { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}
