//! Configuration Error Types

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested configuration file does not exist.
    #[display("configuration file not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The configuration file extension is not one of toml, yaml, yml or json.
    #[display("unsupported configuration format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// A provider failed or a value has the wrong type.
    #[display("could not load configuration")]
    Load,
    /// A value was loaded but is not acceptable.
    #[display("invalid configuration value for '{_0}'")]
    Invalid(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Configuration needs fixing by a human.
        false
    }
}
