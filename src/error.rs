//! Command-line Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A command-line error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration could not be loaded.
    #[display("could not load configuration")]
    Config,
    /// An input path does not exist or could not be opened.
    #[display("could not open {}", _0.display())]
    Input(#[error(not(source))] PathBuf),
    /// None of the given files fit the chosen command.
    #[display("no usable files were given")]
    NothingAccepted,
    /// The output directory is unusable.
    #[display("could not use output directory {}", _0.display())]
    Output(#[error(not(source))] PathBuf),
    /// The export itself failed.
    #[display("export failed")]
    Export,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Export)
    }
}
