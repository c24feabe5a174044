//! Download, verify, and install an app.
//!
//! Ctrl-C during the download cancels cooperatively: the staging file stays
//! behind and a subsequent `kiosk install <id>` resumes from where it
//! stopped, even across process restarts.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::catalog::CatalogClient;
use crate::config::StoreConfig;
use crate::installer::shell::NoopShellIntegrator;
use crate::installer::{BundleInstaller, InstallOutcome};
use crate::transfer::CancelToken;
use crate::utils::progress::TransferBar;

/// Arguments for `kiosk install`.
#[derive(Args)]
pub struct InstallCommand {
    /// App id to install or update.
    id: String,
}

impl InstallCommand {
    /// Resolve the descriptor from the catalog and run the install
    /// pipeline with terminal progress.
    pub async fn execute(self, config: StoreConfig) -> Result<()> {
        let catalog = CatalogClient::new(config.clone())?;
        let descriptor = catalog
            .fetch_app(&self.id)
            .await
            .with_context(|| format!("failed to fetch metadata for '{}'", self.id))?;

        let installer = BundleInstaller::new(config, Arc::new(NoopShellIntegrator))?;

        let cancel = CancelToken::new();
        let ctrl_c = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let bar = TransferBar::new(&format!("downloading {}", descriptor.name));
        let result = installer
            .install(&descriptor, Some(&|event| bar.update(event)), &cancel)
            .await;
        ctrl_c.abort();

        match result {
            Ok(InstallOutcome::Installed(manifest)) => {
                bar.finish("done");
                println!(
                    "{} {} {}",
                    "installed".green().bold(),
                    manifest.name,
                    manifest.version.cyan()
                );
                Ok(())
            }
            Ok(InstallOutcome::Cancelled) => {
                bar.clear();
                println!(
                    "{} download paused; run `kiosk install {}` to resume",
                    "cancelled:".yellow().bold(),
                    self.id
                );
                Ok(())
            }
            Err(err) => {
                bar.clear();
                Err(err).with_context(|| format!("failed to install '{}'", self.id))
            }
        }
    }
}
