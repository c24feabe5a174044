//! List installed apps whose store version differs.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::catalog::CatalogClient;
use crate::config::StoreConfig;
use crate::registry::InstallRegistry;

/// Arguments for `kiosk outdated`.
#[derive(Args)]
pub struct OutdatedCommand {
    /// Exit with status 1 when updates are available (for scripting).
    #[arg(long)]
    check: bool,
}

impl OutdatedCommand {
    /// Cross-reference installed manifests against the store registry.
    ///
    /// "Outdated" means the version strings differ — no ordering is
    /// implied, so a store rollback also shows up here.
    pub async fn execute(self, config: StoreConfig) -> Result<()> {
        let registry = InstallRegistry::new(config.clone());
        let catalog = CatalogClient::new(config)?;
        let store_apps = catalog
            .fetch_registry()
            .await
            .context("failed to fetch the store registry")?;

        let mut outdated = 0usize;
        for descriptor in &store_apps {
            if registry.is_update_available(descriptor) {
                let manifest = registry.read_manifest(&descriptor.id)?;
                println!(
                    "{} {} {} {}",
                    descriptor.name.bold(),
                    manifest.version,
                    "->".dimmed(),
                    descriptor.version.cyan()
                );
                outdated += 1;
            }
        }

        if outdated == 0 {
            println!("All installed apps are up to date.");
        } else {
            println!("\n{outdated} app(s) can be updated");
            if self.check {
                std::process::exit(1);
            }
        }
        Ok(())
    }
}
