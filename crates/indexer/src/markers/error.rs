//! Error types for the [`markers`](super) module.
//!
//! Kept apart from the import errors: a marker that cannot be written is
//! reported as a warning and never fails the import.

use derive_more::{Display, Error};

/// A marker error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for marker operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither `version.info` nor the archive file yielded a modification time.
    #[display("could not determine archive timestamp")]
    Timestamp,
    #[display("could not write marker {_0}")]
    Write(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Write(_))
    }
}
