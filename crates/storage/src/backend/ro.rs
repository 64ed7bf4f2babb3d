use crate::backend::FileInfoStream;
use crate::error::{ErrorKind, Result};
use crate::{BackendHandle, FileInfo, StorageBackend};
use async_trait::async_trait;
use std::path::Path;

/// Wraps a backend so it can only be read.
///
/// Source directories are opened through this, so nothing can end up
/// creating files among the user's pictures.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}

impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn walk(&self) -> FileInfoStream<'_> {
        self.inner.walk()
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path).await
    }

    async fn read_head(&self, path: &Path, bytes: usize) -> Result<Vec<u8>> {
        self.inner.read_head(path, bytes).await
    }

    async fn create(&self, path: &Path, data: &[u8]) -> Result<()> {
        tracing::warn!(backend = self.name(), path = %path.display(), bytes = data.len(), "Refusing write");
        exn::bail!(ErrorKind::ReadOnly(self.name().to_string()))
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.inner.stat(path).await
    }
}
