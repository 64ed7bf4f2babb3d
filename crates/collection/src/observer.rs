use crate::id::ItemId;

/// A mutation that has just been applied to a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Items were inserted, identified in insertion order.
    Added(Vec<ItemId>),
    Removed(ItemId),
    /// Every item was removed; carries how many there were.
    Cleared(usize),
    /// Two neighbouring positions were swapped.
    Reordered { from: usize, to: usize },
    Sorted,
}

/// Receives a [`Change`] after every state-changing operation.
///
/// No-ops (removing an unknown id, reordering at a boundary, clearing an
/// empty collection) are never reported.
pub trait CollectionObserver: Send + Sync {
    fn on_change(&self, change: &Change);
}

impl<F> CollectionObserver for F
where
    F: Fn(&Change) + Send + Sync,
{
    fn on_change(&self, change: &Change) {
        self(change)
    }
}
