use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use slidepack_collection::{Archive, Collection, PreviewRegistry, Slides, SourceFile};

/// Which collection the interface is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Slides,
    Archive,
}

/// Both collections of a session, plus the active view.
///
/// The collections share one preview registry, so a leak check on
/// [`previews`](Self::previews) covers the whole session.
#[derive(Debug)]
pub struct Studio {
    slides: Collection<Slides>,
    archive: Collection<Archive>,
    previews: PreviewRegistry,
    view: View,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl Studio {
    pub fn new() -> Self {
        let previews = PreviewRegistry::new();
        Self {
            slides: Collection::with_registry(previews.clone()),
            archive: Collection::with_registry(previews.clone()),
            previews,
            view: View::default(),
        }
    }

    pub fn slides(&self) -> &Collection<Slides> {
        &self.slides
    }

    pub fn slides_mut(&mut self) -> &mut Collection<Slides> {
        &mut self.slides
    }

    pub fn archive(&self) -> &Collection<Archive> {
        &self.archive
    }

    pub fn archive_mut(&mut self) -> &mut Collection<Archive> {
        &mut self.archive
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            tracing::debug!(?view, "Switched view");
            self.view = view;
        }
    }

    /// Offer every slide's source file to the archive, then switch to it.
    ///
    /// The slides stay where they are. Files already in the archive (same
    /// name and size) are skipped, so the returned count can be lower than
    /// the number of slides.
    pub fn transfer_slides_to_archive(&mut self) -> Result<usize> {
        let files: Vec<SourceFile> = self.slides.source_files().cloned().collect();
        let offered = files.len();
        let added = self.archive.add(files).or_raise(|| ErrorKind::Transfer)?;
        tracing::info!(offered, added, "Transferred slides to archive");
        self.set_view(View::Archive);
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidepack_storage::backend::MockBackend;
    use slidepack_storage::{BackendHandle, FileInfo};
    use std::sync::Arc;
    use std::time::SystemTime;

    fn file(name: &str, size: u64) -> SourceFile {
        let backend: BackendHandle = Arc::new(MockBackend::default());
        SourceFile::new(backend, FileInfo::new(name, size, SystemTime::now()))
    }

    #[test]
    fn test_transfer_copies_and_switches_view() {
        let mut studio = Studio::new();
        studio.slides_mut().add([file("Slide 2.png", 20), file("Slide 1.png", 10)]).unwrap();
        assert_eq!(studio.view(), View::Slides);

        assert_eq!(studio.transfer_slides_to_archive().unwrap(), 2);
        assert_eq!(studio.view(), View::Archive);
        assert_eq!(studio.slides().len(), 2);
        let names: Vec<&str> = studio.archive().items().iter().map(|item| item.name()).collect();
        assert_eq!(names, ["Slide 1.png", "Slide 2.png"]);
        // Archive items carry no preview.
        assert_eq!(studio.previews().live(), 2);
    }

    #[test]
    fn test_transfer_respects_dedup() {
        let mut studio = Studio::new();
        studio.archive_mut().add([file("Slide 1.png", 10)]).unwrap();
        studio.slides_mut().add([file("Slide 1.png", 10), file("Slide 2.png", 20)]).unwrap();

        assert_eq!(studio.transfer_slides_to_archive().unwrap(), 1);
        assert_eq!(studio.archive().len(), 2);
        assert_eq!(studio.transfer_slides_to_archive().unwrap(), 0);
        assert_eq!(studio.archive().len(), 2);
    }

    #[test]
    fn test_transfer_empty_slides() {
        let mut studio = Studio::new();
        assert_eq!(studio.transfer_slides_to_archive().unwrap(), 0);
        assert_eq!(studio.view(), View::Archive);
    }

    #[test]
    fn test_shared_registry() {
        let mut studio = Studio::new();
        studio.slides_mut().add([file("a.png", 1)]).unwrap();
        assert_eq!(studio.previews().live(), 1);
        assert_eq!(studio.slides_mut().clear(&mut true), slidepack_collection::ClearOutcome::Cleared(1));
        assert_eq!(studio.previews().live(), 0);
    }
}
