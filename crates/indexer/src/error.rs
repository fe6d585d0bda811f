//! Import Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Setup failures carry the path that
//! could not be used.

use derive_more::{Display, Error};

/// An import error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which step of the import failed.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not open archive: {_0}")]
    OpenArchive(#[error(not(source))] String),
    /// A full rebuild could not clear the previous index.
    #[display("could not remove existing index: {_0}")]
    RemoveIndex(#[error(not(source))] String),
    #[display("could not open index: {_0}")]
    OpenIndex(#[error(not(source))] String),
    /// The index rejected a batch. Batches flushed before it stay stored.
    #[display("could not store batch in index")]
    Flush,
    /// The archive stopped yielding records because of malformed content.
    #[display("malformed archive: {_0}")]
    Parse(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A busy database might free up; a broken archive won't fix itself.
        matches!(self, Self::OpenIndex(_) | Self::Flush)
    }
}
