use crate::delivery::{deliver, with_suffix};
use crate::error::{ErrorKind, Result};
use crate::naming::{ArtifactNamer, DEFAULT_ARCHIVE_TEMPLATE, DEFAULT_SLIDESHOW_TEMPLATE, NamingContext};
use crate::progress::{ProgressGuard, ProgressIndicator};
use exn::ResultExt;
use slidepack_collection::{Archive, Collection, Slides};
use slidepack_encode::{
    ArchiveEncoder, ArchiveMember, BackendReader, ContentReader, ImagePlacement, Layout, PptxEncoder,
    PresentationEncoder, ZipEncoder,
};
use slidepack_storage::BackendHandle;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::instrument;

/// What an export did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The collection was empty; nothing was shown, read or written.
    Skipped,
    /// The artifact was written to `path` in the sink.
    Delivered { path: PathBuf, members: usize },
}

/// Marks an export as running until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            tracing::warn!("Export requested while another is running");
            exn::bail!(ErrorKind::Busy);
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Turns collections into downloadable artifacts.
///
/// Only one export runs at a time per exporter; a second request while one
/// is in flight fails with [`ErrorKind::Busy`]. Collections are borrowed
/// immutably, so every outcome (success, failure, or a dropped future)
/// leaves them exactly as they were.
pub struct Exporter {
    reader: Arc<dyn ContentReader>,
    archive: Arc<dyn ArchiveEncoder>,
    presentation: Arc<dyn PresentationEncoder>,
    sink: BackendHandle,
    slideshow_name: ArtifactNamer,
    archive_name: ArtifactNamer,
    layout: Layout,
    title: Option<String>,
    in_flight: AtomicBool,
}

impl Exporter {
    /// An exporter writing into `sink` with the stock reader and encoders and
    /// the default naming templates.
    pub fn new(sink: BackendHandle) -> Result<Self> {
        Ok(Self {
            reader: Arc::new(BackendReader),
            archive: Arc::new(ZipEncoder::default()),
            presentation: Arc::new(PptxEncoder),
            sink,
            slideshow_name: DEFAULT_SLIDESHOW_TEMPLATE.parse()?,
            archive_name: DEFAULT_ARCHIVE_TEMPLATE.parse()?,
            layout: Layout::default(),
            title: None,
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn with_reader(mut self, reader: impl ContentReader + 'static) -> Self {
        self.reader = Arc::new(reader);
        self
    }

    pub fn with_archive_encoder(mut self, encoder: impl ArchiveEncoder + 'static) -> Self {
        self.archive = Arc::new(encoder);
        self
    }

    pub fn with_presentation_encoder(mut self, encoder: impl PresentationEncoder + 'static) -> Self {
        self.presentation = Arc::new(encoder);
        self
    }

    /// Replace both naming templates. Fails on templates that don't compile.
    pub fn with_naming(mut self, slideshow: &str, archive: &str) -> Result<Self> {
        self.slideshow_name = slideshow.parse()?;
        self.archive_name = archive.parse()?;
        Ok(self)
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }

    pub fn sink(&self) -> &BackendHandle {
        &self.sink
    }

    /// `true` while an export is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn context(&self) -> NamingContext {
        NamingContext::today().with_title(self.title.clone())
    }

    /// Build a slideshow with one full-bleed slide per item, in order.
    #[instrument(skip_all, fields(items = slides.len(), layout = %self.layout))]
    pub async fn export_slideshow(
        &self,
        slides: &Collection<Slides>,
        progress: &dyn ProgressIndicator,
    ) -> Result<ExportOutcome> {
        if slides.is_empty() {
            tracing::debug!("No slides to export");
            return Ok(ExportOutcome::Skipped);
        }
        let _in_flight = InFlight::acquire(&self.in_flight)?;
        let _progress = ProgressGuard::show(progress, "Generating presentation...");
        self.build_slideshow(slides).await.inspect_err(|err| {
            tracing::error!(error = ?err, "Failed to generate presentation");
        })
    }

    async fn build_slideshow(&self, slides: &Collection<Slides>) -> Result<ExportOutcome> {
        let name = self.slideshow_name.generate_with_ext(&self.context(), self.presentation.extension())?;
        let mut placements = Vec::with_capacity(slides.len());
        for file in slides.source_files() {
            let image = self.reader.read_data_uri(file).await.or_raise(|| ErrorKind::Read)?;
            placements.push(ImagePlacement::full_bleed(file.name(), image, self.layout));
        }
        let members = placements.len();
        let bytes = self.presentation.encode(self.layout, placements).await.or_raise(|| ErrorKind::Encode)?;
        let path = deliver(&self.sink, &name, &bytes).await?;
        Ok(ExportOutcome::Delivered { path, members })
    }

    /// Pack every item into one archive under its original name, in order.
    #[instrument(skip_all, fields(items = files.len()))]
    pub async fn export_archive(
        &self,
        files: &Collection<Archive>,
        progress: &dyn ProgressIndicator,
    ) -> Result<ExportOutcome> {
        if files.is_empty() {
            tracing::debug!("No files to archive");
            return Ok(ExportOutcome::Skipped);
        }
        let _in_flight = InFlight::acquire(&self.in_flight)?;
        let _progress = ProgressGuard::show(progress, "Compressing files...");
        self.build_archive(files).await.inspect_err(|err| {
            tracing::error!(error = ?err, "Failed to create archive");
        })
    }

    async fn build_archive(&self, files: &Collection<Archive>) -> Result<ExportOutcome> {
        let name = self.archive_name.generate_with_ext(&self.context(), self.archive.extension())?;
        let mut members = Vec::with_capacity(files.len());
        let mut taken = HashSet::with_capacity(files.len());
        for file in files.source_files() {
            let data = self.reader.read_bytes(file).await.or_raise(|| ErrorKind::Read)?;
            members.push(ArchiveMember::new(member_name(&mut taken, file.name()), data));
        }
        let count = members.len();
        let bytes = self.archive.encode(members).await.or_raise(|| ErrorKind::Encode)?;
        let path = deliver(&self.sink, &name, &bytes).await?;
        Ok(ExportOutcome::Delivered { path, members: count })
    }
}

/// `name`, or its first `name (n).ext` variant not yet in `taken`.
///
/// Items sharing a name but not a size both make it into the archive.
fn member_name(taken: &mut HashSet<String>, name: &str) -> String {
    let mut candidate = name.to_string();
    let mut n = 0;
    while taken.contains(&candidate) {
        n += 1;
        candidate = with_suffix(Path::new(name), n).to_string_lossy().into_owned();
    }
    if n > 0 {
        tracing::debug!(name, renamed = candidate.as_str(), "Renamed clashing archive member");
    }
    taken.insert(candidate.clone());
    candidate
}
