//! Revocable preview handles.
//!
//! A [`PreviewHandle`] stands in for a short-lived object URL pointing at
//! decoded image data. Handles are registered with a [`PreviewRegistry`]
//! while alive and revoke themselves when dropped, which makes "released
//! exactly once" a property of ownership: the collection item that owns the
//! handle is the only thing that can drop it.

use crate::source::SourceFile;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct RegistryState {
    issued: u64,
    revoked: u64,
    live: HashMap<u64, PathBuf>,
}

/// Issues preview handles and tracks which ones are still alive.
///
/// Cloning is cheap and every clone shares the same bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Bookkeeping only; a panic elsewhere doesn't make it inconsistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate a new handle for `source`.
    pub fn allocate(&self, source: &SourceFile) -> PreviewHandle {
        let mut state = self.lock();
        state.issued += 1;
        let token = state.issued;
        state.live.insert(token, source.path().to_path_buf());
        let url = format!("preview:{}/{:016x}", source.backend().name(), token);
        tracing::trace!(%url, path = %source.path().display(), "Allocated preview");
        PreviewHandle { token, url, registry: self.clone() }
    }

    /// Number of handles allocated and not yet released.
    pub fn live(&self) -> usize {
        self.lock().live.len()
    }

    /// Total number of handles released so far.
    pub fn revoked(&self) -> u64 {
        self.lock().revoked
    }

    fn release(&self, token: u64) {
        let mut state = self.lock();
        match state.live.remove(&token) {
            Some(path) => {
                state.revoked += 1;
                tracing::trace!(token, path = %path.display(), "Revoked preview");
            },
            None => tracing::warn!(token, "Preview handle released twice"),
        }
    }
}

/// A live preview URL. Revoked when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    token: u64,
    url: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.token);
    }
}
