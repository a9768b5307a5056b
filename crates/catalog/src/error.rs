//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
///
/// ### Recoverable by rebuilding
/// - [`ErrorKind::SnapshotMissing`]
/// - [`ErrorKind::IndexCorrupt`]
///
/// ### Fatal for the operation
/// - [`ErrorKind::CorpusUnavailable`]
/// - [`ErrorKind::SnapshotWrite`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The corpus root does not exist or cannot be listed.
    #[display("corpus unavailable: {}", _0.display())]
    CorpusUnavailable(#[error(not(source))] PathBuf),
    /// There is no snapshot at the configured location.
    #[display("index snapshot not found: {}", _0.display())]
    SnapshotMissing(#[error(not(source))] PathBuf),
    /// The snapshot exists but could not be deserialized.
    #[display("corrupt index snapshot: {_0}")]
    IndexCorrupt(#[error(not(source))] String),
    /// The snapshot could not be written.
    #[display("failed to write index snapshot: {}", _0.display())]
    SnapshotWrite(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns `true` if the caller should fall back to a full build.
    pub fn requires_rebuild(&self) -> bool {
        matches!(self, Self::SnapshotMissing(_) | Self::IndexCorrupt(_))
    }
}
