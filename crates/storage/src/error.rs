//! Storage Error Types
//!
//! Errors carry the relative path they concern, so callers can report which
//! picked file went missing without threading the path through themselves.

use derive_more::{Display, Error};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Gone, or removed since it was picked.
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// [`create`](crate::StorageBackend::create) never replaces a file.
    #[display("file already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// The backend only serves source files.
    #[display("backend `{_0}` is read-only")]
    ReadOnly(#[error(not(source))] String),
    /// Empty, contains a null byte, or climbs out of the root.
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// A directory entry resolved to somewhere outside the backend root.
    #[display("outside of backend root: {}", _0.display())]
    OutsideRoot(#[error(not(source))] PathBuf),
    #[display("I/O error: {_0}")]
    Io(IoError),
}

impl ErrorKind {
    /// Classify an I/O failure on `path`.
    pub(crate) fn io(err: IoError, path: &Path) -> Self {
        match err.kind() {
            IoErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            IoErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            IoErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
