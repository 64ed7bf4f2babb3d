//! A directory on the local filesystem.

use crate::backend::FileInfoStream;
use crate::error::{ErrorKind, Result};
use crate::path::{is_hidden, validate as validate_path};
use crate::{FileInfo, StorageBackend};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Files below a root directory, through `tokio::fs`.
///
/// ```no_run
/// use slidepack_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let downloads = LocalBackend::new("downloads", "/home/me/Downloads")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}

impl LocalBackend {
    /// Open the directory `root`, creating it if it does not exist yet.
    ///
    /// # Errors
    ///
    /// [`InvalidPath`](ErrorKind::InvalidPath) if `root` is relative or is
    /// something other than a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() || (root.exists() && !root.is_dir()) {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        // Blocking, but only ever once per backend.
        std::fs::create_dir_all(&root).map_err(|err| ErrorKind::io(err, &root))?;
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        Ok(self.root.join(validate_path(path)?))
    }

    fn info(relative: PathBuf, metadata: &Metadata) -> Result<FileInfo> {
        let modified = metadata.modified().map_err(|err| ErrorKind::io(err, &relative))?;
        Ok(FileInfo::new(relative, metadata.len(), modified))
    }

    /// Visible files and subdirectories directly inside `dir`.
    async fn scan(&self, dir: &Path) -> Result<(Vec<FileInfo>, Vec<PathBuf>)> {
        let (mut files, mut dirs) = (Vec::new(), Vec::new());
        let mut entries = fs::read_dir(dir).await.map_err(|err| ErrorKind::io(err, dir))?;
        while let Some(entry) = entries.next_entry().await.map_err(|err| ErrorKind::io(err, dir))? {
            if is_hidden(&entry.file_name()) {
                continue;
            }
            let absolute = entry.path();
            // Follows symlinks; dangling ones are dropped.
            let Ok(metadata) = fs::metadata(&absolute).await else {
                tracing::debug!(path = %absolute.display(), "Skipping unreadable entry");
                continue;
            };
            if metadata.is_dir() {
                dirs.push(absolute);
            } else if metadata.is_file() {
                let relative = absolute
                    .strip_prefix(&self.root)
                    .or_raise(|| ErrorKind::OutsideRoot(absolute.clone()))?
                    .to_path_buf();
                files.push(Self::info(relative, &metadata)?);
            }
        }
        Ok((files, dirs))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk(&self) -> FileInfoStream<'_> {
        Box::pin(stream! {
            let mut pending = vec![self.root.clone()];
            while let Some(dir) = pending.pop() {
                match self.scan(&dir).await {
                    Ok((files, dirs)) => {
                        pending.extend(dirs);
                        for info in files {
                            yield Ok(info);
                        }
                    },
                    Err(err) => yield Err(err),
                }
            }
        })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let absolute = self.resolve(path)?;
        Ok(fs::read(&absolute).await.map_err(|err| ErrorKind::io(err, path))?)
    }

    async fn read_head(&self, path: &Path, bytes: usize) -> Result<Vec<u8>> {
        let absolute = self.resolve(path)?;
        let file = fs::File::open(&absolute).await.map_err(|err| ErrorKind::io(err, path))?;
        let mut head = Vec::with_capacity(bytes);
        file.take(bytes as u64).read_to_end(&mut head).await.map_err(|err| ErrorKind::io(err, path))?;
        Ok(head)
    }

    async fn create(&self, path: &Path, data: &[u8]) -> Result<()> {
        let absolute = self.resolve(path)?;
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await.map_err(|err| ErrorKind::io(err, path))?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&absolute)
            .await
            .map_err(|err| ErrorKind::io(err, path))?;
        let written = async {
            file.write_all(data).await?;
            file.sync_all().await
        };
        if let Err(err) = written.await {
            // Leave nothing half-written behind.
            let _ = fs::remove_file(&absolute).await;
            exn::bail!(ErrorKind::io(err, path));
        }
        tracing::debug!(backend = self.name.as_str(), path = %path.display(), bytes = data.len(), "Created file");
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let relative = validate_path(path)?;
        let metadata = fs::metadata(self.root.join(&relative)).await.map_err(|err| ErrorKind::io(err, path))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotFound(relative));
        }
        Self::info(relative, &metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend() -> (TempDir, LocalBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("local", dir.path()).unwrap();
        (dir, backend)
    }

    #[test]
    fn test_new_validates_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, b"hello").unwrap();

        assert!(LocalBackend::new("local", "relative/dir").is_err());
        assert!(LocalBackend::new("local", &file).is_err());
        let nested = dir.path().join("out/exports");
        assert_eq!(LocalBackend::new("local", &nested).unwrap().root(), nested);
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let (dir, backend) = backend();
        backend.create(Path::new("exports/out.zip"), b"PK").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("exports/out.zip")).unwrap(), b"PK");
        assert_eq!(backend.read(Path::new("exports/out.zip")).await.unwrap(), b"PK");
        assert_eq!(backend.read_head(Path::new("exports/out.zip"), 1).await.unwrap(), b"P");
        assert_eq!(backend.read_head(Path::new("exports/out.zip"), 64).await.unwrap(), b"PK");
    }

    #[tokio::test]
    async fn test_create_never_replaces() {
        let (dir, backend) = backend();
        std::fs::write(dir.path().join("out.zip"), b"old").unwrap();
        let err = backend.create(Path::new("out.zip"), b"new").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(p) if p == Path::new("out.zip")));
        assert_eq!(std::fs::read(dir.path().join("out.zip")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_read_missing() {
        let (_dir, backend) = backend();
        let err = backend.read(Path::new("gone.png")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stat() {
        let (dir, backend) = backend();
        std::fs::create_dir(dir.path().join("Trip")).unwrap();
        std::fs::write(dir.path().join("Trip/Slide 1.JPG"), b"not really a jpeg").unwrap();

        let info = backend.stat(Path::new("Trip/./Slide 1.JPG")).await.unwrap();
        assert_eq!(info.path, Path::new("Trip/Slide 1.JPG"));
        assert_eq!(info.size, 17);
        assert_eq!(info.mime.as_str(), "image/jpeg");

        let err = backend.stat(Path::new("Trip")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_files_skips_hidden_and_sorts() {
        let (dir, backend) = backend();
        for path in ["b.png", "Trip/a.png", ".DS_Store", ".thumbnails/b.png", "Trip/.hidden.png"] {
            let path = dir.path().join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"data").unwrap();
        }
        let paths: Vec<PathBuf> = backend.files().await.unwrap().into_iter().map(|info| info.path).collect();
        assert_eq!(paths, [PathBuf::from("Trip/a.png"), PathBuf::from("b.png")]);
    }

    #[tokio::test]
    async fn test_paths_stay_inside_root() {
        let (_dir, backend) = backend();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.stat(Path::new("a/../../b")).await.is_err());
        let err = backend.create(Path::new("../escape.zip"), b"PK").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }
}
