use crate::source::SourceFile;

mod sealed {
    pub trait Sealed {}
}

/// Compile-time policy for a [`Collection`](crate::Collection).
///
/// Sealed: the two kinds below are the only ones.
pub trait CollectionKind: sealed::Sealed {
    /// Human-readable name used in log messages.
    const LABEL: &'static str;
    /// Re-sort by name after every successful add.
    const AUTO_SORT: bool;
    /// Skip files whose (`name`, `size`) pair is already present.
    const DEDUP: bool;
    /// Allocate a preview handle for every item.
    const PREVIEWS: bool;

    /// Acceptance filter applied to every offered file.
    fn accepts(file: &SourceFile) -> bool;
}

/// Images destined for a slideshow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slides;
impl sealed::Sealed for Slides {}
impl CollectionKind for Slides {
    const LABEL: &'static str = "slides";
    const AUTO_SORT: bool = true;
    const DEDUP: bool = false;
    const PREVIEWS: bool = true;

    fn accepts(file: &SourceFile) -> bool {
        file.mime().is_image()
    }
}

/// Arbitrary files destined for a ZIP archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Archive;
impl sealed::Sealed for Archive {}
impl CollectionKind for Archive {
    const LABEL: &'static str = "archive";
    const AUTO_SORT: bool = false;
    const DEDUP: bool = true;
    const PREVIEWS: bool = false;

    fn accepts(_file: &SourceFile) -> bool {
        true
    }
}
