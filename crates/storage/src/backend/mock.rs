//! In-memory backend for tests.

use super::FileInfoStream;
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::file::FileInfo;
use crate::path::{has_hidden_component, validate as validate_path};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use time::UtcDateTime;
use tokio::sync::Mutex;

struct MockFile {
    data: Vec<u8>,
    modified: UtcDateTime,
    readable: bool,
}

/// Files held in memory.
///
/// Besides the trait, tests can pull the rug out from under a picked file:
/// [`remove`](Self::remove) deletes it and
/// [`make_unreadable`](Self::make_unreadable) keeps its metadata but fails
/// every read.
///
/// ```
/// use slidepack_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let picker = MockBackend::with_files([("Slide 1.png", b"\x89PNG".to_vec())]);
/// assert_eq!(picker.stat(Path::new("Slide 1.png")).await?.size, 4);
///
/// picker.create(Path::new("Presentation.pptx"), b"PK").await?;
/// assert_eq!(picker.len().await, 2);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    files: Mutex<BTreeMap<PathBuf, MockFile>>,
}

impl MockBackend {
    /// A backend named `mock` holding `files`.
    ///
    /// # Panics
    ///
    /// If a path does not normalise, since that is a broken test.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let modified = UtcDateTime::now();
        let files = files
            .into_iter()
            .map(|(path, data)| {
                let path = path.into();
                match validate_path(&path) {
                    Ok(path) => (path, MockFile { data: data.into(), modified, readable: true }),
                    Err(_) => panic!("MockBackend::with_files: invalid path {}", path.display()),
                }
            })
            .collect();
        Self { name: "mock".to_string(), files: Mutex::new(files) }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fail reads of `path` with [`PermissionDenied`](ErrorKind::PermissionDenied).
    pub async fn make_unreadable(&self, path: impl AsRef<Path>) {
        if let Ok(path) = validate_path(path)
            && let Some(file) = self.files.lock().await.get_mut(&path)
        {
            file.readable = false;
        }
    }

    /// Delete `path`, returning whether it was there.
    pub async fn remove(&self, path: impl AsRef<Path>) -> bool {
        match validate_path(path) {
            Ok(path) => self.files.lock().await.remove(&path).is_some(),
            Err(_) => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }

    async fn contents(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        let files = self.files.lock().await;
        match files.get(&path) {
            Some(file) if file.readable => Ok(file.data.clone()),
            Some(_) => exn::bail!(ErrorKind::PermissionDenied(path)),
            None => exn::bail!(ErrorKind::NotFound(path)),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::with_files(std::iter::empty::<(PathBuf, Vec<u8>)>())
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk(&self) -> FileInfoStream<'_> {
        Box::pin(async_stream::stream! {
            // Snapshot so the lock is not held across yields.
            let snapshot: Vec<FileInfo> = self
                .files
                .lock()
                .await
                .iter()
                .filter(|(path, _)| !has_hidden_component(path))
                .map(|(path, file)| FileInfo::new(path.clone(), file.data.len() as u64, file.modified))
                .collect();
            for info in snapshot {
                yield Ok(info);
            }
        })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.contents(path).await
    }

    async fn read_head(&self, path: &Path, bytes: usize) -> Result<Vec<u8>> {
        let mut data = self.contents(path).await?;
        data.truncate(bytes);
        Ok(data)
    }

    async fn create(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        let mut files = self.files.lock().await;
        if files.contains_key(&path) {
            exn::bail!(ErrorKind::AlreadyExists(path));
        }
        files.insert(path, MockFile { data: data.to_vec(), modified: UtcDateTime::now(), readable: true });
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let path = validate_path(path)?;
        let files = self.files.lock().await;
        let file = files.get(&path).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        Ok(FileInfo::new(path.clone(), file.data.len() as u64, file.modified))
    }
}
