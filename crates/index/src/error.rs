//! Index Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An index error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// The index directory could not be prepared.
    #[display("I/O error")]
    Io,
    /// A value could not be converted to or from its stored representation.
    #[display("invalid index data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    #[display("unsupported storage backend: {_0}")]
    UnsupportedStorage(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // SQLITE_BUSY surfaces as a database error; another writer may let go.
        matches!(self, Self::Database | Self::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::InvalidData("lib id").to_string(), "invalid index data: lib id");
        assert_eq!(ErrorKind::UnsupportedStorage("s3".to_string()).to_string(), "unsupported storage backend: s3");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Database.is_retryable());
        assert!(!ErrorKind::Migration.is_retryable());
        assert!(!ErrorKind::InvalidData("title").is_retryable());
    }
}
