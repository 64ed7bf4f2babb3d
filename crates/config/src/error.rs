//! Configuration Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested configuration file does not exist.
    #[display("configuration file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// A source could not be parsed or has the wrong shape.
    #[display("invalid configuration")]
    Invalid,
    /// A value parsed fine but is not acceptable.
    #[display("invalid value for `{field}`: {reason}")]
    Validation {
        #[error(not(source))]
        field: &'static str,
        #[error(not(source))]
        reason: &'static str,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::NotFound(PathBuf::from("/etc/slidepack.toml")).to_string(),
            "configuration file not found: /etc/slidepack.toml"
        );
        assert_eq!(
            ErrorKind::Validation { field: "naming.archive", reason: "must not be blank" }.to_string(),
            "invalid value for `naming.archive`: must not be blank"
        );
    }
}
