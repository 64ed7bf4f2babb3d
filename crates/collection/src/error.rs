//! Collection Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A collection error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Every file in a non-empty batch was rejected by the collection's
    /// acceptance filter. Nothing was changed; tell the user.
    #[display("none of the {offered} file(s) could be added")]
    NothingAccepted {
        #[error(not(source))]
        offered: usize,
    },
    /// Reorder was asked to move an item that does not exist.
    #[display("index {index} is out of range for a collection of {len}")]
    IndexOutOfRange {
        #[error(not(source))]
        index: usize,
        #[error(not(source))]
        len: usize,
    },
    /// A reorder direction other than `-1` or `+1`.
    #[display("invalid direction: {_0}")]
    InvalidDirection(#[error(not(source))] i8),
    /// The source file could not be inspected (see the inner storage error).
    #[display("could not open source file")]
    Source,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source)
    }
}
