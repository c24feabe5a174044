//! Search the store registry.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::catalog::{search, CatalogClient};
use crate::config::StoreConfig;
use crate::registry::InstallRegistry;

/// Arguments for `kiosk search`.
#[derive(Args)]
pub struct SearchCommand {
    /// Substring to match against names, descriptions, and tags.
    query: String,

    /// Search only the featured list instead of the full registry.
    #[arg(long)]
    featured: bool,
}

impl SearchCommand {
    /// Fetch the registry (cache permitting) and print matching apps.
    pub async fn execute(self, config: StoreConfig) -> Result<()> {
        let registry = InstallRegistry::new(config.clone());
        let catalog = CatalogClient::new(config)?;
        let apps = if self.featured {
            catalog.fetch_featured().await
        } else {
            catalog.fetch_registry().await
        }
        .context("failed to fetch the store registry")?;

        let matches = search(&apps, &self.query);
        if matches.is_empty() {
            println!("No apps matching '{}'.", self.query);
            return Ok(());
        }

        for app in matches {
            let installed = if registry.is_installed(&app.id) {
                " [installed]".green().to_string()
            } else {
                String::new()
            };
            println!(
                "{} {} {}{installed}",
                app.name.bold(),
                app.version.cyan(),
                format!("({})", app.id).dimmed()
            );
            if !app.description.is_empty() {
                println!("  {}", app.description.dimmed());
            }
        }
        Ok(())
    }
}
