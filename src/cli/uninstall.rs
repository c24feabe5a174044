//! Remove an installed app.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::StoreConfig;
use crate::installer::shell::NoopShellIntegrator;
use crate::installer::BundleInstaller;

/// Arguments for `kiosk uninstall`.
#[derive(Args)]
pub struct UninstallCommand {
    /// App id to remove.
    id: String,
}

impl UninstallCommand {
    /// Remove the app directory and manifest, reporting whether anything
    /// was actually installed.
    pub async fn execute(self, config: StoreConfig) -> Result<()> {
        let installer = BundleInstaller::new(config, Arc::new(NoopShellIntegrator))?;
        if installer.uninstall(&self.id).await? {
            println!("{} {}", "uninstalled".green().bold(), self.id);
        } else {
            println!("'{}' is not installed", self.id);
        }
        Ok(())
    }
}
