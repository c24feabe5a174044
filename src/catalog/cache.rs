//! Filesystem-backed store for cached catalog documents.
//!
//! Deliberately independent of the HTTP client: the read-through policy in
//! [`super::CatalogClient`] composes over this `{load, store, age}` surface,
//! so freshness and stale-serve logic unit-test without any network mocking.
//!
//! Entries are JSON documents named by cache key inside the scratch cache
//! directory; the file modification time doubles as the last-fetch
//! timestamp. Everything here is reconstructible from the remote catalog,
//! so the whole directory is safe to purge between operations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::core::Result;
use crate::utils::fs::{atomic_write, ensure_dir};

/// On-disk cache of catalog documents, keyed by file name.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Load the cached document for `key`, regardless of age.
    ///
    /// Returns `None` when no entry exists or the entry fails to parse
    /// (a corrupt cache file is logged and treated as absent).
    #[must_use]
    pub fn load(&self, key: &str) -> Option<Value> {
        let path = self.path(key);
        let bytes = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(doc) => Some(doc),
            Err(err) => {
                warn!("discarding corrupt cache entry {}: {err}", path.display());
                None
            }
        }
    }

    /// Persist a freshly fetched document under `key`.
    ///
    /// The write is atomic, so a reader can never observe a half-written
    /// entry.
    pub fn store(&self, key: &str, doc: &Value) -> Result<()> {
        ensure_dir(&self.root)?;
        atomic_write(&self.path(key), &serde_json::to_vec(doc)?)
    }

    /// Age of the entry for `key`, measured from its last-fetch time.
    ///
    /// `None` when no entry exists or the platform cannot report file
    /// times.
    #[must_use]
    pub fn age(&self, key: &str) -> Option<Duration> {
        let modified = std::fs::metadata(self.path(key)).ok()?.modified().ok()?;
        modified.elapsed().ok()
    }

    /// Whether the entry for `key` exists and is younger than `max_age`.
    #[must_use]
    pub fn is_fresh(&self, key: &str, max_age: Duration) -> bool {
        self.age(key).is_some_and(|age| age < max_age)
    }

    /// Root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
