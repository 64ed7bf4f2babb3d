//! Storage backends standing in for the host file API.
//!
//! Source files are read through a [`StorageBackend`] (usually a
//! [`ReadOnlyBackend`](backend::ReadOnlyBackend) around a
//! [`LocalBackend`](backend::LocalBackend)), and finished artifacts are
//! "downloaded" by writing them into another backend.

pub mod backend;
pub mod error;
pub mod file;
pub mod mime;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::file::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
