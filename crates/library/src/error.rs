//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a failure.
///
/// ### Query Errors
/// Returned straight to the caller and never worth retrying.
/// - [`ErrorKind::VariantIndexOutOfRange`]
/// - [`ErrorKind::UnsupportedFormat`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Catalog`]
/// - [`ErrorKind::Descriptor`]
/// - [`ErrorKind::Fetch`]
/// - [`ErrorKind::Corpus`]
/// - [`ErrorKind::Archive`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The selected variant is not in the listed range.
    #[display("variant {index} is out of range; {len} variants available")]
    VariantIndexOutOfRange { index: usize, len: usize },
    /// The selected variant has no mirror counterpart; pick another one.
    #[display("unsupported format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// Building, loading or saving the catalog index failed.
    #[display("catalog index unavailable")]
    Catalog,
    /// A matched entry's descriptor could not be re-parsed.
    #[display("failed to read descriptor: {}", _0.display())]
    Descriptor(#[error(not(source))] PathBuf),
    /// A remote file could not be fetched.
    #[display("failed to fetch {_0}")]
    Fetch(#[error(not(source))] String),
    /// The corpus directory could not be put in place.
    #[display("failed to prepare corpus at {}", _0.display())]
    Corpus(#[error(not(source))] PathBuf),
    /// The catalog archive could not be unpacked, or did not contain a corpus.
    #[display("failed to extract archive: {}", _0.display())]
    Archive(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}
