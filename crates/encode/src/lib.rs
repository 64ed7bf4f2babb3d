//! Encoders for the two export artifacts.
//!
//! Each one sits behind a trait so the export pipeline only ever sees
//! "something that turns members into bytes":
//!
//! - [`ContentReader`] materialises a source file into a [`DataUri`].
//! - [`ArchiveEncoder`] packs `(name, bytes)` members into an archive
//!   ([`ZipEncoder`]).
//! - [`PresentationEncoder`] lays images out one per slide
//!   ([`PptxEncoder`]).

mod archive;
pub mod error;
mod presentation;
mod reader;

pub use crate::archive::{ArchiveEncoder, ArchiveMember, ZipEncoder};
pub use crate::presentation::{ImageFormat, ImagePlacement, Layout, PptxEncoder, PresentationEncoder};
pub use crate::reader::{BackendReader, ContentReader, DataUri};
