//! Engine configuration and on-disk layout.
//!
//! All filesystem roots and remote endpoints are explicit values on
//! [`StoreConfig`], passed into each component at construction. Nothing in
//! the library reads ambient globals, so tests redirect both roots at a
//! [`tempfile::TempDir`](https://docs.rs/tempfile) and run fully isolated.
//!
//! # On-disk layout
//!
//! ```text
//! ~/.kiosk/
//! ├── apps/                  # installation tree, owned by the installer/registry
//! │   └── <id>/              # one directory per app id
//! │       ├── manifest.json  # authoritative "installed" record
//! │       └── ...            # unpacked bundle contents
//! └── cache/                 # scratch area, safe to purge when idle
//!     ├── <id>.zip           # in-flight staging files (resume offsets)
//!     └── <key>              # cached catalog documents
//! ```
//!
//! # Environment overrides
//!
//! - `KIOSK_HOME` — replaces the `~/.kiosk` root (apps and cache move with it)
//! - `KIOSK_STORE_URL` — replaces the default store base URL

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{CONNECT_TIMEOUT, MANIFEST_FILE, READ_TIMEOUT, STAGING_EXTENSION};
use crate::core::{KioskError, Result};

/// Base URL of the public store used when no override is configured.
pub const DEFAULT_STORE_URL: &str = "https://apps.kioskstore.dev";

/// Explicit configuration for every kiosk component.
///
/// Construct with [`StoreConfig::new`] for the user's real home layout, or
/// [`StoreConfig::with_roots`] to point everything at arbitrary directories
/// (the test suites do this with temp dirs).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the remote catalog, without a trailing slash.
    pub store_url: String,
    /// Root of the installation tree (`apps/<id>/`).
    pub apps_dir: PathBuf,
    /// Scratch root for staging files and cached catalog documents.
    pub cache_dir: PathBuf,
    /// Per-request connect timeout.
    pub connect_timeout: Duration,
    /// Per-request read timeout. Applies to individual requests, not to a
    /// whole resumable transfer.
    pub read_timeout: Duration,
}

impl StoreConfig {
    /// Build the standard configuration rooted at the user's home directory,
    /// honoring `KIOSK_HOME` and `KIOSK_STORE_URL` overrides.
    ///
    /// # Errors
    ///
    /// Fails when no home directory can be determined and `KIOSK_HOME` is
    /// not set.
    pub fn new() -> Result<Self> {
        let home = match std::env::var_os("KIOSK_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    KioskError::filesystem("~", "cannot determine home directory; set KIOSK_HOME")
                })?
                .join(".kiosk"),
        };
        let store_url = std::env::var("KIOSK_STORE_URL")
            .unwrap_or_else(|_| DEFAULT_STORE_URL.to_string());
        Ok(Self::with_roots(
            store_url,
            home.join("apps"),
            home.join("cache"),
        ))
    }

    /// Build a configuration with explicit roots.
    pub fn with_roots(
        store_url: impl Into<String>,
        apps_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        let mut store_url = store_url.into();
        while store_url.ends_with('/') {
            store_url.pop();
        }
        Self {
            store_url,
            apps_dir: apps_dir.into(),
            cache_dir: cache_dir.into(),
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }

    /// URL of the full registry document.
    #[must_use]
    pub fn registry_url(&self) -> String {
        format!("{}/index.json", self.store_url)
    }

    /// URL of the featured-apps document.
    #[must_use]
    pub fn featured_url(&self) -> String {
        format!("{}/featured.json", self.store_url)
    }

    /// URL of a single app's metadata document.
    #[must_use]
    pub fn app_metadata_url(&self, id: &str) -> String {
        format!("{}/apps/{id}/metadata.json", self.store_url)
    }

    /// Installation directory for an app id.
    #[must_use]
    pub fn app_dir(&self, id: &str) -> PathBuf {
        self.apps_dir.join(id)
    }

    /// Path of an app's installation manifest.
    #[must_use]
    pub fn manifest_path(&self, id: &str) -> PathBuf {
        self.app_dir(id).join(MANIFEST_FILE)
    }

    /// Staging file for an app's in-flight download.
    ///
    /// Lives outside the final install tree; its length is the resume offset
    /// for the next fetch attempt.
    #[must_use]
    pub fn staging_path(&self, id: &str) -> PathBuf {
        self.cache_dir.join(format!("{id}.{STAGING_EXTENSION}"))
    }

    /// Path of a cached catalog document.
    #[must_use]
    pub fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn with_roots_strips_trailing_slash() {
        let config = StoreConfig::with_roots("https://store.example//", "/tmp/a", "/tmp/c");
        assert_eq!(config.store_url, "https://store.example");
        assert_eq!(config.registry_url(), "https://store.example/index.json");
    }

    #[test]
    fn layout_helpers_key_by_id() {
        let config = StoreConfig::with_roots("https://store.example", "/data/apps", "/data/cache");
        assert_eq!(config.app_dir("calc"), Path::new("/data/apps/calc"));
        assert_eq!(
            config.manifest_path("calc"),
            Path::new("/data/apps/calc/manifest.json")
        );
        assert_eq!(
            config.staging_path("calc"),
            Path::new("/data/cache/calc.zip")
        );
        assert_eq!(
            config.app_metadata_url("calc"),
            "https://store.example/apps/calc/metadata.json"
        );
    }
}
