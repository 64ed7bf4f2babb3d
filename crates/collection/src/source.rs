use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use slidepack_storage::mime::{Mime, SNIFF_LEN};
use slidepack_storage::{BackendHandle, FileInfo};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

/// A raw file handle as offered by a file picker or a drop.
///
/// Holds a reference to the backend the bytes live in, never the bytes
/// themselves. Metadata is captured once when the handle is created and is
/// read-only afterwards; the content may still disappear from the backend,
/// in which case [`read`](Self::read) fails.
#[derive(Clone)]
pub struct SourceFile {
    backend: BackendHandle,
    path: PathBuf,
    name: String,
    size: u64,
    mime: Mime,
}

impl SourceFile {
    /// Wrap metadata already obtained from `backend` (from a listing, say).
    pub fn new(backend: BackendHandle, info: FileInfo) -> Self {
        let name = info.file_name();
        Self { backend, path: info.path, name, size: info.size, mime: info.mime }
    }

    /// Stat `path` in `backend` and sniff its MIME type.
    ///
    /// Magic bytes are only read when the extension says nothing useful.
    pub async fn open(backend: &BackendHandle, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut info = backend.stat(path).await.or_raise(|| ErrorKind::Source)?;
        if info.mime.is_octet_stream() {
            let head = backend.read_head(path, SNIFF_LEN).await.or_raise(|| ErrorKind::Source)?;
            info = info.with_mime(Mime::sniff(path, &head));
        }
        Ok(Self::new(backend.clone(), info))
    }

    /// Read the complete file contents from the backend.
    pub async fn read(&self) -> slidepack_storage::error::Result<Vec<u8>> {
        self.backend.read(&self.path).await
    }

    pub fn backend(&self) -> &BackendHandle {
        &self.backend
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name (the final path component).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime(&self) -> &Mime {
        &self.mime
    }

    /// The de-duplication key used by the archive collection.
    pub fn dedup_key(&self) -> (&str, u64) {
        (&self.name, self.size)
    }
}

impl Debug for SourceFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SourceFile")
            .field("backend", &self.backend.name())
            .field("path", &self.path)
            .field("size", &self.size)
            .field("mime", &self.mime)
            .finish()
    }
}
