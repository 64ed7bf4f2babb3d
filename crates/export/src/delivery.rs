use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use slidepack_storage::BackendHandle;
use slidepack_storage::error::ErrorKind as StorageErrorKind;
use std::path::{Path, PathBuf};

/// Give up looking for a free name after this many suffixes.
const MAX_SUFFIX: u32 = 9_999;

/// `Name (n).ext`, the way browsers rename downloads that already exist.
pub(crate) fn with_suffix(path: &Path, n: u32) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    };
    path.with_file_name(name)
}

/// Create `name` in `sink` holding `bytes`, or the first free
/// `name (n).ext` variant if it is taken.
///
/// Returns the path actually written.
#[tracing::instrument(level = "debug", skip(sink, bytes), fields(sink = sink.name(), bytes = bytes.len()))]
pub async fn deliver(sink: &BackendHandle, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let requested = PathBuf::from(name);
    let mut path = requested.clone();
    for n in 1..=MAX_SUFFIX + 1 {
        match sink.create(&path, bytes).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = bytes.len(), "Delivered artifact");
                return Ok(path);
            },
            Err(err) if matches!(*err, StorageErrorKind::AlreadyExists(_)) => path = with_suffix(&requested, n),
            Err(err) => return Err(err).or_raise(|| ErrorKind::Deliver),
        }
    }
    tracing::warn!(name, "No free file name left");
    exn::bail!(ErrorKind::Deliver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use slidepack_storage::backend::{MockBackend, ReadOnlyBackend};
    use std::sync::Arc;

    #[rstest]
    #[case("Presentation_2024-03-07.pptx", 1, "Presentation_2024-03-07 (1).pptx")]
    #[case("exports/Archived.zip", 12, "exports/Archived (12).zip")]
    #[case("README", 2, "README (2)")]
    fn test_with_suffix(#[case] path: &str, #[case] n: u32, #[case] expected: &str) {
        assert_eq!(with_suffix(Path::new(path), n), Path::new(expected));
    }

    #[tokio::test]
    async fn test_deliver_free_name() {
        let mock = Arc::new(MockBackend::default());
        let sink: BackendHandle = mock.clone();
        let path = deliver(&sink, "out.zip", b"PK").await.unwrap();
        assert_eq!(path, Path::new("out.zip"));
        assert_eq!(sink.read(&path).await.unwrap(), b"PK");
    }

    #[tokio::test]
    async fn test_deliver_never_overwrites() {
        let mock = Arc::new(MockBackend::with_files([("out.zip", b"old".to_vec()), ("out (1).zip", b"old".to_vec())]));
        let sink: BackendHandle = mock.clone();
        let path = deliver(&sink, "out.zip", b"new").await.unwrap();
        assert_eq!(path, Path::new("out (2).zip"));
        assert_eq!(sink.read(Path::new("out.zip")).await.unwrap(), b"old");
        assert_eq!(mock.len().await, 3);
    }

    #[tokio::test]
    async fn test_deliver_to_read_only_sink() {
        let sink: BackendHandle = Arc::new(ReadOnlyBackend::new(Arc::new(MockBackend::default())));
        let err = deliver(&sink, "out.zip", b"PK").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Deliver);
    }
}
