//! File metadata returned by storage backends.

use crate::mime::Mime;
use std::path::PathBuf;
use time::OffsetDateTime;

/// File metadata returned by storage backends.
///
/// This represents information about a file in storage, used for listing
/// operations and when wrapping a file into a collection item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
    /// MIME type guessed from the file extension
    pub mime: Mime,
}
impl FileInfo {
    /// Create a new FileInfo from a listing operation.
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: impl Into<OffsetDateTime>) -> Self {
        let path = path.into();
        let mime = Mime::from_path(&path);
        Self { path, size, modified: modified.into(), mime }
    }

    /// Override the guessed MIME type (after sniffing magic bytes, for example).
    pub fn with_mime(mut self, mime: Mime) -> Self {
        self.mime = mime;
        self
    }

    /// Final path component, used as the display name of the file.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}
