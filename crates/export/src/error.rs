//! Export Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An export error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Every one of them leaves the exported collection untouched, so the user
/// can fix the cause and try again.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Another export is still running; wait for it to finish.
    #[display("an export is already in progress")]
    Busy,
    /// An item's content could not be read.
    #[display("could not read an item")]
    Read,
    /// The encoder rejected the content or failed to assemble the artifact.
    #[display("could not encode the artifact")]
    Encode,
    /// The naming template could not be compiled or rendered.
    #[display("invalid artifact name template")]
    Template,
    /// Writing the artifact to its destination failed.
    #[display("could not deliver the artifact")]
    Deliver,
    /// Moving files between collections failed.
    #[display("could not transfer files")]
    Transfer,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::Read | Self::Deliver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Busy.to_string(), "an export is already in progress");
        assert_eq!(ErrorKind::Deliver.to_string(), "could not deliver the artifact");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Busy.is_retryable());
        assert!(ErrorKind::Read.is_retryable());
        assert!(!ErrorKind::Encode.is_retryable());
        assert!(!ErrorKind::Template.is_retryable());
    }
}
