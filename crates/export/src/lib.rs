//! The export pipeline.
//!
//! An [`Exporter`] turns the current state of a collection into one
//! artifact: a slideshow for [`Slides`](slidepack_collection::Slides), a ZIP
//! for [`Archive`](slidepack_collection::Archive). Items are materialised
//! strictly in collection order and the first failure aborts the whole
//! export before anything is written. The finished artifact is "downloaded"
//! by writing it into a sink [`StorageBackend`](slidepack_storage::StorageBackend).
//!
//! [`Studio`] bundles the two collections the way the interface presents
//! them, including the slides-to-archive transfer.

mod delivery;
pub mod error;
mod exporter;
mod naming;
mod progress;
mod studio;

pub use crate::delivery::deliver;
pub use crate::exporter::{ExportOutcome, Exporter};
pub use crate::naming::{ArtifactNamer, DEFAULT_ARCHIVE_TEMPLATE, DEFAULT_SLIDESHOW_TEMPLATE, NamingContext};
pub use crate::progress::{LogProgress, NoProgress, ProgressGuard, ProgressIndicator};
pub use crate::studio::{Studio, View};
