use crate::error::{Error, ErrorKind, Result};
use crate::id::{IdGenerator, ItemId};
use crate::kind::CollectionKind;
use crate::natural::natural_cmp;
use crate::observer::{Change, CollectionObserver};
use crate::preview::{PreviewHandle, PreviewRegistry};
use crate::source::SourceFile;
use slidepack_storage::mime::Mime;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

/// One entry of a collection: a source file plus its identity.
#[derive(Debug)]
pub struct CollectionItem {
    id: ItemId,
    source: SourceFile,
    preview: Option<PreviewHandle>,
}

impl CollectionItem {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn size(&self) -> u64 {
        self.source.size()
    }

    pub fn mime(&self) -> &Mime {
        self.source.mime()
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    /// Only slide items carry a preview.
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }
}

/// Which neighbour [`Collection::reorder`] swaps with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the front (`-1`).
    Backward,
    /// Towards the back (`+1`).
    Forward,
}

impl TryFrom<i8> for Direction {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            -1 => Ok(Self::Backward),
            1 => Ok(Self::Forward),
            other => exn::bail!(ErrorKind::InvalidDirection(other)),
        }
    }
}

/// Result of [`Collection::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing to clear; confirmation was not requested.
    Empty,
    /// The user said no.
    Declined,
    /// This many items were removed.
    Cleared(usize),
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// A fixed answer, e.g. from a `--yes` flag.
impl Confirm for bool {
    fn confirm(&mut self, _prompt: &str) -> bool {
        *self
    }
}

/// Adapts a closure into a [`Confirm`].
///
/// ```
/// use slidepack_collection::{Confirm, Prompt};
///
/// let mut asked = Vec::new();
/// let mut prompt = Prompt(|question: &str| {
///     asked.push(question.to_string());
///     false
/// });
/// assert!(!prompt.confirm("Remove everything?"));
/// drop(prompt);
/// assert_eq!(asked, ["Remove everything?"]);
/// ```
pub struct Prompt<F>(pub F);

impl<F> Confirm for Prompt<F>
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        (self.0)(prompt)
    }
}

/// An ordered collection of files of kind `K`.
pub struct Collection<K: CollectionKind> {
    items: Vec<CollectionItem>,
    ids: IdGenerator,
    previews: PreviewRegistry,
    observers: Vec<Box<dyn CollectionObserver>>,
    kind: PhantomData<K>,
}

impl<K: CollectionKind> Default for Collection<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: CollectionKind> Collection<K> {
    /// An empty collection with its own preview registry.
    pub fn new() -> Self {
        Self::with_registry(PreviewRegistry::new())
    }

    /// An empty collection issuing previews from a shared `registry`.
    pub fn with_registry(previews: PreviewRegistry) -> Self {
        Self { items: Vec::new(), ids: IdGenerator::default(), previews, observers: Vec::new(), kind: PhantomData }
    }

    pub fn subscribe(&mut self, observer: impl CollectionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&self, change: Change) {
        for observer in &self.observers {
            observer.on_change(&change);
        }
    }

    fn contains_key(&self, key: (&str, u64)) -> bool {
        self.items.iter().any(|item| item.source.dedup_key() == key)
    }

    /// Offer a batch of files, returning how many were actually inserted.
    ///
    /// An empty batch is not an error. A non-empty batch in which the
    /// acceptance filter rejects every file fails with
    /// [`NothingAccepted`](ErrorKind::NothingAccepted) and changes nothing.
    /// Files the filter rejects in a partially accepted batch are dropped
    /// silently, as are duplicates in a de-duplicating collection (including
    /// duplicates within the batch itself).
    pub fn add(&mut self, files: impl IntoIterator<Item = SourceFile>) -> Result<usize> {
        let files: Vec<SourceFile> = files.into_iter().collect();
        let offered = files.len();
        if offered == 0 {
            return Ok(0);
        }
        let accepted: Vec<SourceFile> = files
            .into_iter()
            .filter(|file| {
                let accepted = K::accepts(file);
                if !accepted {
                    tracing::debug!(collection = K::LABEL, name = file.name(), mime = %file.mime(), "Rejected file");
                }
                accepted
            })
            .collect();
        if accepted.is_empty() {
            tracing::warn!(collection = K::LABEL, offered, "No files accepted");
            exn::bail!(ErrorKind::NothingAccepted { offered });
        }

        let mut added = Vec::with_capacity(accepted.len());
        for source in accepted {
            if K::DEDUP && self.contains_key(source.dedup_key()) {
                tracing::debug!(collection = K::LABEL, name = source.name(), size = source.size(), "Skipped duplicate");
                continue;
            }
            let preview = K::PREVIEWS.then(|| self.previews.allocate(&source));
            let id = self.ids.next_id();
            self.items.push(CollectionItem { id, source, preview });
            added.push(id);
        }
        if added.is_empty() {
            return Ok(0);
        }
        if K::AUTO_SORT {
            self.sort_items();
        }
        let count = added.len();
        tracing::debug!(collection = K::LABEL, offered, added = count, total = self.items.len(), "Added files");
        self.notify(Change::Added(added));
        Ok(count)
    }

    /// Remove the item with `id`. Returns `false` (and does nothing) if no
    /// such item exists. The item's preview, if any, is released.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            return false;
        };
        let item = self.items.remove(position);
        tracing::debug!(collection = K::LABEL, %id, name = item.name(), "Removed item");
        drop(item);
        self.notify(Change::Removed(id));
        true
    }

    /// Remove every item after asking `confirm`. An empty collection returns
    /// [`ClearOutcome::Empty`] without asking.
    pub fn clear(&mut self, confirm: &mut impl Confirm) -> ClearOutcome {
        if self.items.is_empty() {
            return ClearOutcome::Empty;
        }
        let count = self.items.len();
        let prompt = format!("Remove all {count} item(s) from the {} collection?", K::LABEL);
        if !confirm.confirm(&prompt) {
            tracing::debug!(collection = K::LABEL, "Clear declined");
            return ClearOutcome::Declined;
        }
        // Dropping the items releases their previews.
        self.items.clear();
        tracing::debug!(collection = K::LABEL, count, "Cleared collection");
        self.notify(Change::Cleared(count));
        ClearOutcome::Cleared(count)
    }

    /// Swap the item at `index` with its neighbour in `direction`.
    ///
    /// Moving the first item backward or the last item forward does nothing.
    pub fn reorder(&mut self, index: usize, direction: Direction) -> Result<()> {
        let len = self.items.len();
        if index >= len {
            exn::bail!(ErrorKind::IndexOutOfRange { index, len });
        }
        let target = match direction {
            Direction::Backward => index.checked_sub(1),
            Direction::Forward => Some(index + 1).filter(|&target| target < len),
        };
        let Some(target) = target else {
            return Ok(());
        };
        self.items.swap(index, target);
        tracing::debug!(collection = K::LABEL, from = index, to = target, "Reordered item");
        self.notify(Change::Reordered { from: index, to: target });
        Ok(())
    }

    fn sort_items(&mut self) {
        self.items.sort_by(|a, b| natural_cmp(a.name(), b.name()));
    }

    /// Sort by name in natural order. Equal names keep their relative order.
    pub fn sort_by_name(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.sort_items();
        self.notify(Change::Sorted);
    }

    pub fn items(&self) -> &[CollectionItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&CollectionItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The raw files behind every item, in collection order.
    pub fn source_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.items.iter().map(|item| &item.source)
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }
}

impl<K: CollectionKind> Debug for Collection<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Collection")
            .field("kind", &K::LABEL)
            .field("items", &self.items)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Archive, Slides};
    use rstest::rstest;
    use slidepack_storage::backend::MockBackend;
    use slidepack_storage::{BackendHandle, FileInfo};
    use std::sync::{Arc, Mutex};
    use std::time::SystemTime;

    fn backend() -> BackendHandle {
        Arc::new(MockBackend::default())
    }

    fn file(name: &str, size: u64) -> SourceFile {
        SourceFile::new(backend(), FileInfo::new(name, size, SystemTime::now()))
    }

    fn names<K: CollectionKind>(collection: &Collection<K>) -> Vec<&str> {
        collection.items().iter().map(CollectionItem::name).collect()
    }

    fn recorder<K: CollectionKind>(collection: &mut Collection<K>) -> Arc<Mutex<Vec<Change>>> {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        collection.subscribe(move |change: &Change| sink.lock().unwrap().push(change.clone()));
        changes
    }

    #[test]
    fn test_slides_sorted_after_add() {
        let mut slides = Collection::<Slides>::new();
        let added = slides.add([file("Slide 10.png", 1), file("Slide 2.png", 1), file("Slide 1.png", 1)]).unwrap();
        assert_eq!(added, 3);
        assert_eq!(names(&slides), ["Slide 1.png", "Slide 2.png", "Slide 10.png"]);

        slides.add([file("Slide 3.jpg", 1)]).unwrap();
        assert_eq!(names(&slides), ["Slide 1.png", "Slide 2.png", "Slide 3.jpg", "Slide 10.png"]);
    }

    #[test]
    fn test_slides_filter_non_images() {
        let mut slides = Collection::<Slides>::new();
        let added = slides.add([file("notes.txt", 5), file("cover.png", 7)]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(names(&slides), ["cover.png"]);
    }

    #[test]
    fn test_slides_nothing_accepted() {
        let mut slides = Collection::<Slides>::new();
        slides.add([file("cover.png", 7)]).unwrap();
        let changes = recorder(&mut slides);

        let err = slides.add([file("notes.txt", 5), file("data.csv", 6)]).unwrap_err();
        assert_eq!(*err, ErrorKind::NothingAccepted { offered: 2 });
        assert_eq!(names(&slides), ["cover.png"]);
        assert!(changes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_batch_is_not_an_error() {
        let mut slides = Collection::<Slides>::new();
        assert_eq!(slides.add(Vec::new()).unwrap(), 0);
        assert!(slides.is_empty());
    }

    #[test]
    fn test_slides_allow_duplicates() {
        let mut slides = Collection::<Slides>::new();
        slides.add([file("a.png", 1), file("a.png", 1)]).unwrap();
        assert_eq!(slides.len(), 2);
    }

    #[test]
    fn test_archive_keeps_arrival_order() {
        let mut archive = Collection::<Archive>::new();
        archive.add([file("z.txt", 1), file("Slide 10.png", 2), file("a.bin", 3)]).unwrap();
        assert_eq!(names(&archive), ["z.txt", "Slide 10.png", "a.bin"]);
        assert!(archive.items().iter().all(|item| item.preview().is_none()));
    }

    #[test]
    fn test_archive_dedup() {
        let mut archive = Collection::<Archive>::new();
        assert_eq!(archive.add([file("a.txt", 100)]).unwrap(), 1);
        assert_eq!(archive.add([file("a.txt", 100)]).unwrap(), 0);
        assert_eq!(archive.len(), 1);

        // Same name, different size is a different file.
        assert_eq!(archive.add([file("a.txt", 101)]).unwrap(), 1);
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_archive_dedup_within_batch() {
        let mut archive = Collection::<Archive>::new();
        let added = archive.add([file("a.txt", 100), file("b.txt", 100), file("a.txt", 100)]).unwrap();
        assert_eq!(added, 2);
        assert_eq!(names(&archive), ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_duplicates_only_batch_does_not_notify() {
        let mut archive = Collection::<Archive>::new();
        archive.add([file("a.txt", 100)]).unwrap();
        let changes = recorder(&mut archive);
        assert_eq!(archive.add([file("a.txt", 100)]).unwrap(), 0);
        assert!(changes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ids_unique_and_stable() {
        let mut archive = Collection::<Archive>::new();
        archive.add([file("a", 1), file("b", 2)]).unwrap();
        let first = archive.items()[0].id();
        archive.remove(archive.items()[1].id());
        archive.add([file("c", 3)]).unwrap();
        assert_eq!(archive.items()[0].id(), first);
        assert_ne!(archive.items()[1].id(), first);
        assert_eq!(archive.get(first).map(CollectionItem::name), Some("a"));
    }

    #[test]
    fn test_remove_releases_preview() {
        let mut slides = Collection::<Slides>::new();
        slides.add([file("a.png", 1), file("b.png", 2)]).unwrap();
        assert_eq!(slides.previews().live(), 2);

        let id = slides.items()[0].id();
        assert!(slides.remove(id));
        assert_eq!(names(&slides), ["b.png"]);
        assert_eq!(slides.previews().live(), 1);
        assert_eq!(slides.previews().revoked(), 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut slides = Collection::<Slides>::new();
        slides.add([file("a.png", 1)]).unwrap();
        let id = slides.items()[0].id();
        assert!(slides.remove(id));
        let changes = recorder(&mut slides);

        assert!(!slides.remove(id));
        assert!(slides.is_empty());
        assert_eq!(slides.previews().revoked(), 1);
        assert!(changes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_clear_declined() {
        let mut slides = Collection::<Slides>::new();
        slides.add([file("a.png", 1), file("b.png", 2)]).unwrap();
        assert_eq!(slides.clear(&mut false), ClearOutcome::Declined);
        assert_eq!(slides.len(), 2);
        assert_eq!(slides.previews().live(), 2);
    }

    #[test]
    fn test_clear_accepted_releases_previews() {
        let mut slides = Collection::<Slides>::new();
        slides.add([file("a.png", 1), file("b.png", 2)]).unwrap();
        let changes = recorder(&mut slides);

        let mut prompts = Vec::new();
        let outcome = slides.clear(&mut Prompt(|prompt: &str| {
            prompts.push(prompt.to_string());
            true
        }));
        assert_eq!(outcome, ClearOutcome::Cleared(2));
        assert_eq!(prompts.len(), 1);
        assert!(slides.is_empty());
        assert_eq!(slides.previews().live(), 0);
        assert_eq!(slides.previews().revoked(), 2);
        assert_eq!(*changes.lock().unwrap(), [Change::Cleared(2)]);
    }

    #[test]
    fn test_clear_empty_does_not_ask() {
        let mut archive = Collection::<Archive>::new();
        let outcome = archive.clear(&mut Prompt(|_: &str| -> bool { panic!("should not be asked") }));
        assert_eq!(outcome, ClearOutcome::Empty);
    }

    #[test]
    fn test_drop_releases_previews() {
        let registry = PreviewRegistry::new();
        {
            let mut slides = Collection::<Slides>::with_registry(registry.clone());
            slides.add([file("a.png", 1)]).unwrap();
            assert_eq!(registry.live(), 1);
        }
        assert_eq!(registry.live(), 0);
        assert_eq!(registry.revoked(), 1);
    }

    #[rstest]
    #[case(0, Direction::Backward, ["a", "b", "c"])]
    #[case(2, Direction::Forward, ["a", "b", "c"])]
    #[case(0, Direction::Forward, ["b", "a", "c"])]
    #[case(2, Direction::Backward, ["a", "c", "b"])]
    #[case(1, Direction::Backward, ["b", "a", "c"])]
    fn test_reorder(#[case] index: usize, #[case] direction: Direction, #[case] expected: [&str; 3]) {
        let mut archive = Collection::<Archive>::new();
        archive.add([file("a", 1), file("b", 2), file("c", 3)]).unwrap();
        archive.reorder(index, direction).unwrap();
        assert_eq!(names(&archive), expected);
    }

    #[test]
    fn test_reorder_boundary_does_not_notify() {
        let mut archive = Collection::<Archive>::new();
        archive.add([file("a", 1), file("b", 2)]).unwrap();
        let changes = recorder(&mut archive);
        archive.reorder(0, Direction::Backward).unwrap();
        archive.reorder(1, Direction::Forward).unwrap();
        assert!(changes.lock().unwrap().is_empty());

        archive.reorder(1, Direction::Backward).unwrap();
        assert_eq!(*changes.lock().unwrap(), [Change::Reordered { from: 1, to: 0 }]);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut archive = Collection::<Archive>::new();
        archive.add([file("a", 1)]).unwrap();
        let err = archive.reorder(1, Direction::Backward).unwrap_err();
        assert_eq!(*err, ErrorKind::IndexOutOfRange { index: 1, len: 1 });
    }

    #[rstest]
    #[case(-1, Some(Direction::Backward))]
    #[case(1, Some(Direction::Forward))]
    #[case(0, None)]
    #[case(2, None)]
    fn test_direction_try_from(#[case] value: i8, #[case] expected: Option<Direction>) {
        assert_eq!(Direction::try_from(value).ok(), expected);
    }

    #[test]
    fn test_sort_by_name_is_stable() {
        let mut archive = Collection::<Archive>::new();
        archive.add([file("Slide 10", 1), file("slide 2", 2), file("Slide 2", 3), file("Slide 1", 4)]).unwrap();
        archive.sort_by_name();
        let sizes: Vec<u64> = archive.items().iter().map(CollectionItem::size).collect();
        assert_eq!(sizes, [4, 2, 3, 1]);
    }

    #[test]
    fn test_add_notifies_in_insertion_order() {
        let mut archive = Collection::<Archive>::new();
        let changes = recorder(&mut archive);
        archive.add([file("a", 1), file("b", 2)]).unwrap();
        let ids: Vec<ItemId> = archive.items().iter().map(CollectionItem::id).collect();
        assert_eq!(*changes.lock().unwrap(), [Change::Added(ids)]);
    }
}
