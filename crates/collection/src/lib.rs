//! Ordered collections of user-picked files.
//!
//! A [`Collection`] is the single owner of one subsystem's list of items and
//! the only thing allowed to mutate it. Two kinds exist:
//!
//! - [`Slides`] accepts only images, allocates a [`PreviewHandle`] per item
//!   and keeps itself in [natural order](natural::natural_cmp) after every add.
//! - [`Archive`] accepts anything, preserves arrival order and skips files
//!   whose (`name`, `size`) pair is already present.
//!
//! Every mutation is reported to registered [`CollectionObserver`]s so a
//! presentation layer can re-render without the collection knowing about it.

mod collection;
pub mod error;
mod id;
mod kind;
pub mod natural;
mod observer;
mod preview;
mod source;

pub use crate::collection::{ClearOutcome, Collection, CollectionItem, Confirm, Direction, Prompt};
pub use crate::id::ItemId;
pub use crate::kind::{Archive, CollectionKind, Slides};
pub use crate::observer::{Change, CollectionObserver};
pub use crate::preview::{PreviewHandle, PreviewRegistry};
pub use crate::source::SourceFile;
