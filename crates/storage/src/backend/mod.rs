//! Storage backends.
//!
//! A backend is a rooted tree of files addressed by relative paths. Source
//! files are walked and read from one; finished artifacts are created in
//! another.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use crate::file::FileInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

pub(crate) type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// A rooted tree of files.
///
/// Every path passed in is relative to the root and normalised with
/// [`validate_path`](crate::validate_path) before use; anything that would
/// leave the root fails with [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// ```
/// use std::path::Path;
/// use slidepack_storage::{backend::StorageBackend, error::Result};
///
/// async fn total_size(backend: &dyn StorageBackend) -> Result<u64> {
///     Ok(backend.files().await?.iter().map(|info| info.size).sum())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, for logs and preview URLs.
    fn name(&self) -> &str;

    /// Stream every visible file below the root, in no particular order.
    ///
    /// Hidden entries (a name starting with `.`) are skipped, and so is
    /// everything beneath a hidden directory.
    fn walk(&self) -> FileInfoStream<'_>;

    /// Every visible file below the root, sorted by path.
    async fn files(&self) -> Result<Vec<FileInfo>> {
        let mut files: Vec<FileInfo> = self.walk().try_collect().await?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Read the whole file.
    ///
    /// Fails with [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// has been removed since it was picked.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Read at most the first `bytes` bytes, for magic byte sniffing.
    async fn read_head(&self, path: &Path, bytes: usize) -> Result<Vec<u8>>;

    /// Create a new file holding `data`, with any missing parent directories.
    ///
    /// Never replaces an existing file: that is reported as
    /// [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) so the caller
    /// can pick another name.
    async fn create(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Metadata of a single file. Directories count as not found.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;
}
