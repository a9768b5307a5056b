//! Descriptor Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Every variant here belongs to the same class from the caller's point of
//! view: the descriptor is malformed and should be skipped.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A descriptor error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for descriptor parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The descriptor file could not be read from disk.
    #[display("unreadable descriptor: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// The XML structure is too broken to process.
    #[display("malformed XML: {_0}")]
    MalformedXml(#[error(not(source))] String),
    /// The document is well-formed XML but not a catalog descriptor.
    #[display("invalid descriptor: missing ebook element")]
    InvalidDocument,
    /// A required field could not be found in the document.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// Details about the parsing failure.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The corpus is static; a descriptor that failed once fails forever.
        false
    }
}
