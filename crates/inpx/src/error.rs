//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive file could not be read.
    #[display("I/O error")]
    Io,
    /// The file is not a readable zip container.
    #[display("invalid archive")]
    InvalidArchive,
    /// A required entry is absent from the container.
    #[display("missing archive entry: {_0}")]
    MissingEntry(#[error(not(source))] &'static str),
    /// The entry exists but carries no usable modification time.
    #[display("no modification time for archive entry: {_0}")]
    NoTimestamp(#[error(not(source))] &'static str),
    /// A listing line could not be turned into a record.
    #[display("malformed record in {entry} at line {line}")]
    Record {
        /// Name of the `.inp` listing inside the archive.
        entry: String,
        /// One-based line number within the listing.
        line: usize,
    },
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The raw value found in the listing.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The archive is either readable or it isn't; only a flaky disk
        // might give a different answer the second time around.
        matches!(self, Self::Io)
    }
}
