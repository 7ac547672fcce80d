//! Error types for xsd2codemirror
//!
//! This module defines all error types used throughout the library.
//! Three kinds matter to callers: schema compilation failures, grammar
//! constructs the walker does not model, and API misuse. The remaining
//! variants are plumbing that the compiler folds into compilation failures.

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsd2codemirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// The schema could not be compiled into a usable object model
    #[error("schema compilation error: {0}")]
    Compile(#[from] ParseError),

    /// The grammar uses a content-model construct that is not modelled
    #[error("unsupported grammar construct: {0}")]
    UnsupportedConstruct(String),

    /// An operation was called out of order or with the wrong arguments
    #[error("invalid usage: {0}")]
    InvalidUsage(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a plumbing error raised while reading `location` into a
    /// compilation error. Errors that already carry a kind callers
    /// distinguish are returned unchanged.
    pub fn into_compile_error(self, location: impl Into<String>) -> Self {
        match self {
            Error::Compile(_) | Error::UnsupportedConstruct(_) | Error::InvalidUsage(_) => self,
            other => Error::Compile(ParseError::new(other.to_string()).with_location(location)),
        }
    }

    /// Whether this is a schema compilation error
    pub fn is_compile(&self) -> bool {
        matches!(self, Error::Compile(_))
    }
}

/// XML Schema compilation error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema file
    pub location: Option<String>,
    /// Schema source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("Undefined type reference 'tns:missing'")
            .with_location("schema.xsd")
            .with_source("<xs:element name='a' type='tns:missing'/>");

        let msg = format!("{}", err);
        assert!(msg.contains("Undefined type reference"));
        assert!(msg.contains("Location: schema.xsd"));
        assert!(msg.contains("Source:"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ParseError::new("test").into();
        assert!(matches!(err, Error::Compile(_)));
        assert!(err.is_compile());
    }

    #[test]
    fn test_into_compile_error_wraps_plumbing() {
        let err = Error::Xml("unexpected end of file".to_string()).into_compile_error("a.xsd");
        match err {
            Error::Compile(parse) => {
                assert!(parse.message.contains("unexpected end of file"));
                assert_eq!(parse.location.as_deref(), Some("a.xsd"));
            }
            other => panic!("expected compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_into_compile_error_keeps_unsupported() {
        let err = Error::UnsupportedConstruct("openContent".to_string()).into_compile_error("a.xsd");
        assert!(matches!(err, Error::UnsupportedConstruct(_)));
    }
}
