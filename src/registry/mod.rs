//! Queries over the local installation tree.
//!
//! [`InstallRegistry`] reads the per-app `manifest.json` records that
//! [`crate::installer::BundleInstaller`] writes. The manifest is the single
//! authority for "is this app installed" and "at which version": directory
//! contents beyond the manifest are never inspected.
//!
//! Listing is tolerant by design — an app directory whose manifest fails to
//! parse is logged and skipped, never fatal to the overall listing, so one
//! corrupted app cannot hide every other installed app from the user.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::constants::MANIFEST_FILE;
use crate::core::{KioskError, Result};
use crate::models::{AppDescriptor, InstalledManifest};
use crate::utils::fs::read_json_file;

/// Read-side view of the apps root.
#[derive(Debug, Clone)]
pub struct InstallRegistry {
    config: StoreConfig,
}

impl InstallRegistry {
    /// Create a registry over the configured apps root.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Enumerate the manifests of all installed apps.
    ///
    /// A missing apps root means nothing is installed. Entries without a
    /// manifest (or with an unreadable one) are skipped with a warning.
    pub fn list_installed(&self) -> Result<Vec<InstalledManifest>> {
        let root = &self.config.apps_dir;
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(KioskError::filesystem(root, e)),
        };

        let mut installed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| KioskError::filesystem(root, e))?;
            let manifest_path = entry.path().join(MANIFEST_FILE);
            if !manifest_path.is_file() {
                continue;
            }
            match read_json_file::<InstalledManifest>(&manifest_path) {
                Ok(manifest) => installed.push(manifest),
                Err(err) => {
                    warn!(
                        "skipping unreadable manifest {}: {err}",
                        manifest_path.display()
                    );
                }
            }
        }
        installed.sort_by(|a, b| a.id.cmp(&b.id));
        debug!("{} app(s) installed under {}", installed.len(), root.display());
        Ok(installed)
    }

    /// Whether a manifest exists for `id`.
    ///
    /// Existence only; no validation of the unpacked tree beyond that.
    #[must_use]
    pub fn is_installed(&self, id: &str) -> bool {
        self.config.manifest_path(id).is_file()
    }

    /// Read the installed manifest for `id`.
    ///
    /// # Errors
    ///
    /// [`KioskError::AppNotFound`] when no manifest exists; parse errors
    /// surface as [`KioskError::Json`].
    pub fn read_manifest(&self, id: &str) -> Result<InstalledManifest> {
        let path = self.config.manifest_path(id);
        if !path.is_file() {
            return Err(KioskError::AppNotFound { id: id.to_string() });
        }
        read_json_file(&path)
    }

    /// Whether the catalog offers a different version than the one
    /// installed.
    ///
    /// `false` when the app is not installed at all, or when its manifest is
    /// unreadable. Versions are opaque strings: *any* difference counts as
    /// an update, with no ordering applied ("1.0" vs "1.0" is current,
    /// "1.0" vs "1.0.1" — and equally "2.0" vs "1.9" — is an update).
    #[must_use]
    pub fn is_update_available(&self, descriptor: &AppDescriptor) -> bool {
        match self.read_manifest(&descriptor.id) {
            Ok(manifest) => manifest.version != descriptor.version,
            Err(_) => false,
        }
    }

    /// Resolve and validate the entry-point path for an installed app.
    ///
    /// The engine guarantees the manifest and the entry file exist on disk;
    /// actually spawning the app is the launch collaborator's job.
    ///
    /// # Errors
    ///
    /// [`KioskError::AppNotFound`] when the app is not installed,
    /// [`KioskError::EntryNotFound`] when the manifest's entry point is
    /// missing from the unpacked tree.
    pub fn entry_path(&self, id: &str) -> Result<PathBuf> {
        let manifest = self.read_manifest(id)?;
        let entry = self.config.app_dir(id).join(&manifest.entry);
        if !entry.exists() {
            return Err(KioskError::EntryNotFound {
                id: id.to_string(),
                path: entry.display().to_string(),
            });
        }
        Ok(entry)
    }
}
