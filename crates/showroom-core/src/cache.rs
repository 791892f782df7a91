//! Path-keyed asset cache
//!
//! Parsed assets are shared by every viewer session that shows the same path.
//! The cache is generic over the handle type so the engine layer can store its
//! own asset handles while the bookkeeping stays testable here:
//! - a path is fetched at most once while its entry is alive
//! - an empty path is never fetched (nothing is selected yet)
//! - a failed entry keeps its error until [`AssetCache::retry`] evicts it

use std::collections::HashMap;

use crate::error::AssetLoadError;

/// Load status of a cached path
#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus<H> {
    /// Requested, not parsed yet
    Loading(H),
    /// Parsed and usable
    Ready(H),
    /// Fetch or parse failed; the handle has been released
    Failed(AssetLoadError),
}

/// Cache of asset handles keyed by normalized path
#[derive(Debug, Clone)]
pub struct AssetCache<H> {
    entries: HashMap<String, AssetStatus<H>>,
}

impl<H> Default for AssetCache<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H: Clone> AssetCache<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `path`, calling `fetch` only on the first request.
    ///
    /// Returns `None` for an empty path or a path whose load already failed.
    pub fn checkout(&mut self, path: &str, fetch: impl FnOnce(&str) -> H) -> Option<H> {
        if path.is_empty() {
            return None;
        }

        match self.entries.get(path) {
            Some(AssetStatus::Loading(handle)) | Some(AssetStatus::Ready(handle)) => {
                tracing::debug!(path, "Asset cache hit");
                Some(handle.clone())
            }
            Some(AssetStatus::Failed(_)) => None,
            None => {
                tracing::info!(path, "Starting to load model");
                let handle = fetch(path);
                self.entries
                    .insert(path.to_string(), AssetStatus::Loading(handle.clone()));
                Some(handle)
            }
        }
    }

    /// Mark a loading entry as parsed
    pub fn mark_ready(&mut self, path: &str) {
        if let Some(AssetStatus::Loading(handle)) = self.entries.get(path) {
            let handle = handle.clone();
            self.entries.insert(path.to_string(), AssetStatus::Ready(handle));
        }
    }

    /// Record a failure and drop the handle
    pub fn mark_failed(&mut self, error: AssetLoadError) {
        self.entries
            .insert(error.path().to_string(), AssetStatus::Failed(error));
    }

    /// Evict a failed entry so the next checkout fetches again.
    ///
    /// Returns `true` when an entry was evicted.
    pub fn retry(&mut self, path: &str) -> bool {
        if matches!(self.entries.get(path), Some(AssetStatus::Failed(_))) {
            self.entries.remove(path);
            true
        } else {
            false
        }
    }

    pub fn status(&self, path: &str) -> Option<&AssetStatus<H>> {
        self.entries.get(path)
    }

    pub fn is_ready(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(AssetStatus::Ready(_)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
