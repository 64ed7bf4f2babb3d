//! Encoder Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An encoding error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for encoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source file could not be read (see the inner storage error).
    #[display("could not read {_0}")]
    Read(#[error(not(source))] String),
    /// Not a `data:<mime>;base64,<payload>` string.
    #[display("malformed data URI: {_0}")]
    InvalidDataUri(#[error(not(source))] &'static str),
    /// The presentation format has no way to embed this image type.
    #[display("unsupported image type: {_0}")]
    UnsupportedImage(#[error(not(source))] String),
    /// Not a known slide layout name.
    #[display("unsupported layout: {_0}")]
    UnsupportedLayout(#[error(not(source))] String),
    /// Two archive members share a name.
    #[display("duplicate archive member: {_0}")]
    DuplicateMember(#[error(not(source))] String),
    /// A built-in package part is missing from the binary.
    #[display("missing package part: {_0}")]
    MissingPart(#[error(not(source))] String),
    /// Writing the ZIP container failed.
    #[display("could not write archive")]
    Archive,
    /// The blocking encoder task panicked or was cancelled.
    #[display("encoder task failed")]
    Task,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Task)
    }
}
