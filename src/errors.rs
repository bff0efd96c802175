use crate::ScalarError;
use std::{fmt, io};

/// An error that can occur when processing INI data
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    pub(crate) fn parse(line: usize, kind: ParseErrorKind) -> Error {
        Error::new(ErrorKind::Parse(ParseError { line, kind }))
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Error {
        Error::new(ErrorKind::Unsupported(msg.into()))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume the error and return the specific type of error
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the 1-based line that the error occurs on (if available)
    pub fn line(&self) -> Option<usize> {
        match *self.0 {
            ErrorKind::Parse(ref err) => Some(err.line),
            _ => None,
        }
    }
}

/// Specific type of error
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The INI text was malformed
    #[error(transparent)]
    Parse(ParseError),

    /// An error occurred when binding the parse tree to a record
    #[error("deserialize error: {0}")]
    Deserialize(#[from] DeserializeError),

    /// The record being encoded has a shape that can't be expressed as INI
    #[error("unsupported value for INI encoding: {0}")]
    Unsupported(String),

    /// A key or section name can't be written without corrupting the output
    #[error("invalid {what} for INI output: {name:?}")]
    InvalidName { what: &'static str, name: String },

    /// A generic serde serialization error
    #[error("serialize error: {0}")]
    Message(String),

    /// The output sink failed
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Deserialize(ref err) => Some(err),
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<DeserializeError> for Error {
    fn from(error: DeserializeError) -> Self {
        Error::new(ErrorKind::Deserialize(error))
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::new(ErrorKind::Message(msg.to_string()))
    }
}

/// Malformed INI text and the line it was found on
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub(crate) line: usize,
    pub(crate) kind: ParseErrorKind,
}

impl ParseError {
    /// The 1-based line number
    pub fn line(&self) -> usize {
        self.line
    }

    /// What was wrong with the line
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

/// The type of syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// Input is not valid utf-8
    #[error("invalid utf-8")]
    InvalidUtf8,

    /// A `[` header without the closing `]`
    #[error("unterminated section header")]
    UnterminatedSection,

    /// A `[]` header
    #[error("section name cannot be empty")]
    EmptySectionName,

    /// A line that is neither a header, comment, nor `key=value`
    #[error("expected `=` after key {0:?}")]
    MissingSeparator(String),

    /// A `=value` line
    #[error("property key cannot be empty")]
    EmptyKey,

    /// A `key[sub=value` line
    #[error("unterminated map key in {0:?}")]
    UnterminatedMapKey(String),
}

/// A Serde deserialization error.
#[derive(Debug, Clone, thiserror::Error)]
#[error(transparent)]
pub struct DeserializeError {
    pub(crate) kind: DeserializeErrorKind,
}

impl DeserializeError {
    pub(crate) fn type_mismatch(expected: &'static str, found: impl Into<String>) -> Self {
        DeserializeError {
            kind: DeserializeErrorKind::TypeMismatch {
                expected,
                found: found.into(),
            },
        }
    }

    /// Return the underlying error kind.
    pub fn kind(&self) -> &DeserializeErrorKind {
        &self.kind
    }

    pub(crate) fn is_nested_record(&self) -> bool {
        matches!(self.kind, DeserializeErrorKind::NestedRecord { .. })
    }

    pub(crate) fn is_missing_value(&self) -> bool {
        matches!(self.kind, DeserializeErrorKind::MissingValue { .. })
    }
}

/// The type of a Serde deserialization error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeserializeErrorKind {
    /// A generic Serde deserialization error
    #[error("{0}")]
    Message(String),

    /// The parse tree entry doesn't have the shape the destination requires
    #[error("cannot bind {found} into {expected}")]
    TypeMismatch { expected: &'static str, found: String },

    /// A raw value could not be converted into the destination scalar
    #[error("cannot convert {value:?} into {ty}{}: {source}", Location(.record, .field))]
    Conversion {
        value: String,
        ty: &'static str,
        record: Option<&'static str>,
        field: Option<&'static str>,
        source: ScalarError,
    },

    /// A record was requested more than one section level deep
    #[error("record field {field:?} is nested deeper than one section level")]
    NestedRecord { field: &'static str },

    /// An optional field holds an entry that doesn't have the shape of its inner type
    #[error("field {field:?} has no {expected} to bind")]
    MissingValue {
        field: &'static str,
        expected: &'static str,
    },
}

struct Location<'a>(&'a Option<&'static str>, &'a Option<&'static str>);

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.0, self.1) {
            (Some(record), Some(field)) => write!(f, " (field {}.{})", record, field),
            (None, Some(field)) => write!(f, " (field {})", field),
            _ => Ok(()),
        }
    }
}

impl serde::de::Error for DeserializeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DeserializeError {
            kind: DeserializeErrorKind::Message(msg.to_string()),
        }
    }
}
