//! Bundle installation orchestration.
//!
//! [`BundleInstaller`] owns the whole acquisition pipeline for one catalog
//! descriptor:
//!
//! ```text
//! NotInstalled → Downloading → Verifying → Unpacking → Installed
//! ```
//!
//! - **Downloading** delegates to [`crate::transfer::ResumableTransfer`];
//!   a cancelled download returns [`InstallOutcome::Cancelled`] and leaves
//!   the staging file so the next call resumes, even across process
//!   restarts.
//! - **Verifying** streams the staged archive through
//!   [`crate::checksum::ChecksumVerifier`]. A mismatch deletes the staging
//!   file before the error is returned — the artifact is untrustworthy and
//!   must never be retried as-is.
//! - **Unpacking** replaces the app directory wholesale. Updates and
//!   re-installs are destructive replacements of the whole tree, never a
//!   merge, so a half-old-half-new install cannot exist.
//! - The `manifest.json` written last is the authoritative record of
//!   "installed at version X"; failures before that point leave the app in
//!   the NotInstalled state with the staging file cleaned up.
//!
//! Shell integration (launch shortcuts) runs after a successful install and
//! is best-effort: failures are logged, never escalated.
//!
//! # Concurrency
//!
//! At most one install/update per app id runs at a time — both would write
//! the same staging file and app directory. A second call for an id already
//! in flight fails fast with [`KioskError::InstallInProgress`]. Apps with
//! distinct ids share no state and install fully in parallel. Verify and
//! unpack are short critical sections without cancellation points; only the
//! download is cancellable.

pub mod shell;

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::checksum::ChecksumVerifier;
use crate::config::StoreConfig;
use crate::core::{KioskError, Result};
use crate::models::{validate_app_id, AppDescriptor, InstalledManifest};
use crate::transfer::{CancelToken, ProgressFn, ResumableTransfer};
use crate::utils::fs::{ensure_dir, remove_dir_all, remove_file_if_exists, write_json_file};
use shell::ShellIntegrator;

/// Terminal state of an `install` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The bundle is verified, unpacked, and recorded in the manifest.
    Installed(InstalledManifest),
    /// The download was cancelled; partial state remains for resumption.
    Cancelled,
}

/// Orchestrates download, verification, unpacking, and manifest bookkeeping.
pub struct BundleInstaller {
    config: StoreConfig,
    transfer: ResumableTransfer,
    shell: Arc<dyn ShellIntegrator>,
    in_flight: DashMap<String, ()>,
}

/// Removes the in-flight marker when an install finishes by any path.
struct InFlightGuard<'a> {
    map: &'a DashMap<String, ()>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.id);
    }
}

impl BundleInstaller {
    /// Build an installer for the given configuration and shell integrator.
    ///
    /// # Errors
    ///
    /// Fails only when the transfer engine's HTTP client cannot be built.
    pub fn new(config: StoreConfig, shell: Arc<dyn ShellIntegrator>) -> Result<Self> {
        let transfer = ResumableTransfer::new(&config)?;
        Ok(Self {
            config,
            transfer,
            shell,
            in_flight: DashMap::new(),
        })
    }

    /// Download, verify, unpack, and register the app described by
    /// `descriptor`.
    ///
    /// Progress events cover the download phase. Cancellation is honored at
    /// download-chunk granularity and reported as
    /// [`InstallOutcome::Cancelled`], not as an error.
    ///
    /// # Errors
    ///
    /// - [`KioskError::InvalidAppId`] for unsafe descriptor ids,
    /// - [`KioskError::InstallInProgress`] when the same id is already being
    ///   installed,
    /// - [`KioskError::Network`] / [`KioskError::IncompleteTransfer`] from
    ///   the download (staging is kept, the next call resumes),
    /// - [`KioskError::ChecksumMismatch`] after the staging file has been
    ///   purged,
    /// - [`KioskError::Filesystem`] for unpack or manifest failures (app
    ///   returns to the not-installed state, staging cleaned up).
    pub async fn install(
        &self,
        descriptor: &AppDescriptor,
        on_progress: Option<&ProgressFn<'_>>,
        cancel: &CancelToken,
    ) -> Result<InstallOutcome> {
        descriptor.validate()?;
        let id = descriptor.id.clone();

        match self.in_flight.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(KioskError::InstallInProgress { id });
            }
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }
        let _guard = InFlightGuard {
            map: &self.in_flight,
            id: id.clone(),
        };

        ensure_dir(&self.config.apps_dir)?;
        ensure_dir(&self.config.cache_dir)?;

        let staging = self.config.staging_path(&id);
        info!("installing '{id}' {} from {}", descriptor.version, descriptor.download);

        let outcome = self
            .transfer
            .fetch(&descriptor.download, &staging, on_progress, cancel)
            .await?;
        if outcome.is_cancelled() {
            return Ok(InstallOutcome::Cancelled);
        }

        debug!("verifying staged bundle for '{id}'");
        if !ChecksumVerifier::verify(&staging, &descriptor.checksum).await {
            let actual = ChecksumVerifier::compute(&staging, descriptor.checksum.algorithm)
                .await
                .unwrap_or_else(|_| "<unreadable>".to_string());
            remove_file_if_exists(&staging)?;
            return Err(KioskError::ChecksumMismatch {
                id,
                expected: descriptor.checksum.to_string(),
                actual,
            });
        }

        debug!("unpacking bundle for '{id}'");
        if let Err(err) = self.unpack(&id, &staging).await {
            // Unpack failure returns the app to NotInstalled: no partial
            // tree, no stale staging artifact.
            let _ = remove_dir_all(&self.config.app_dir(&id));
            let _ = remove_file_if_exists(&staging);
            return Err(err);
        }

        let manifest = InstalledManifest::from_descriptor(descriptor);
        write_json_file(&self.config.manifest_path(&id), &manifest)?;
        remove_file_if_exists(&staging)?;

        let entry = self.config.app_dir(&id).join(&manifest.entry);
        if let Err(err) = self.shell.register_launcher(&manifest, &entry) {
            warn!("shell integration failed for '{id}' (install still succeeded): {err}");
        }

        info!("installed '{id}' at version {}", manifest.version);
        Ok(InstallOutcome::Installed(manifest))
    }

    /// Remove an installed app: manifest, directory, and launch entry.
    ///
    /// Returns whether anything was removed. Uninstalling an app that is
    /// not installed returns `false`, never an error.
    pub async fn uninstall(&self, id: &str) -> Result<bool> {
        validate_app_id(id)?;
        let app_dir = self.config.app_dir(id);
        if !app_dir.exists() {
            debug!("uninstall of '{id}': nothing installed");
            return Ok(false);
        }

        // Shell teardown first, while the manifest still exists to name the
        // launch entry. Best-effort either way.
        match crate::utils::fs::read_json_file::<InstalledManifest>(&self.config.manifest_path(id))
        {
            Ok(manifest) => {
                if let Err(err) = self.shell.remove_launcher(&manifest) {
                    warn!("shell teardown failed for '{id}' (uninstall continues): {err}");
                }
            }
            Err(err) => warn!("uninstalling '{id}' without a readable manifest: {err}"),
        }

        let dir = app_dir.clone();
        tokio::task::spawn_blocking(move || remove_dir_all(&dir))
            .await
            .map_err(|e| KioskError::filesystem(&app_dir, e))??;

        info!("uninstalled '{id}'");
        Ok(true)
    }

    async fn unpack(&self, id: &str, staging: &std::path::Path) -> Result<()> {
        let app_dir = self.config.app_dir(id);
        let staging = staging.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<()> {
            // Destructive replacement: the previous tree goes away before
            // the new one lands, so versions never mix.
            remove_dir_all(&app_dir)?;
            ensure_dir(&app_dir)?;
            let file =
                std::fs::File::open(&staging).map_err(|e| KioskError::filesystem(&staging, e))?;
            let mut archive =
                zip::ZipArchive::new(file).map_err(|e| KioskError::filesystem(&staging, e))?;
            archive
                .extract(&app_dir)
                .map_err(|e| KioskError::filesystem(&app_dir, e))?;
            Ok(())
        })
        .await
        .map_err(|e| KioskError::filesystem(self.config.app_dir(id), e))?
    }
}
