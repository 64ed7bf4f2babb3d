//! Relative path normalisation.

use crate::error::{ErrorKind, Result};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Normalise a path relative to a backend root.
///
/// `.` and repeated separators are dropped, `..` is resolved lexically and a
/// leading `/` is ignored. Paths that climb above the root, contain a null
/// byte, carry a Windows prefix or resolve to nothing are rejected with
/// [`InvalidPath`](ErrorKind::InvalidPath).
///
/// ```
/// use std::path::Path;
/// use slidepack_storage::validate_path;
///
/// assert_eq!(validate_path("Trip/./Day 1/../Slide 1.png").unwrap(), Path::new("Trip/Slide 1.png"));
/// assert!(validate_path("../Slide 1.png").is_err());
/// assert!(validate_path("").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in original.components() {
        match component {
            Component::Normal(part) if part.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(part) => normalized.push(part),
            Component::CurDir | Component::RootDir => {},
            Component::ParentDir if normalized.pop() => {},
            Component::ParentDir | Component::Prefix(_) => exn::bail!(invalid()),
        }
    }
    if normalized.as_os_str().is_empty() {
        exn::bail!(invalid());
    }
    Ok(normalized)
}

/// Dotfiles (`.DS_Store`, `.thumbnails/`) are never offered as sources.
pub(crate) fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}

/// `true` if any component of the relative `path` is hidden.
pub(crate) fn has_hidden_component(path: &Path) -> bool {
    path.components().any(|component| matches!(component, Component::Normal(part) if is_hidden(part)))
}
