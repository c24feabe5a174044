//! Show one app's catalog metadata and local install state.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::catalog::CatalogClient;
use crate::config::StoreConfig;
use crate::registry::InstallRegistry;

/// Arguments for `kiosk info`.
#[derive(Args)]
pub struct InfoCommand {
    /// App id to look up.
    id: String,
}

impl InfoCommand {
    /// Print the store metadata for one app, annotated with whether it is
    /// installed locally and whether an update is available.
    pub async fn execute(self, config: StoreConfig) -> Result<()> {
        let registry = InstallRegistry::new(config.clone());
        let catalog = CatalogClient::new(config)?;
        let descriptor = catalog
            .fetch_app(&self.id)
            .await
            .with_context(|| format!("failed to fetch metadata for '{}'", self.id))?;

        println!("{}  {}", descriptor.name.bold(), descriptor.version.cyan());
        println!("id:          {}", descriptor.id);
        if !descriptor.author.is_empty() {
            println!("author:      {}", descriptor.author);
        }
        if !descriptor.description.is_empty() {
            println!("description: {}", descriptor.description);
        }
        println!("download:    {}", descriptor.download);
        println!("checksum:    {}", descriptor.checksum);
        println!("entry:       {}", descriptor.entry);
        if !descriptor.tags.is_empty() {
            println!("tags:        {}", descriptor.tags.join(", "));
        }

        match registry.read_manifest(&self.id) {
            Ok(manifest) if registry.is_update_available(&descriptor) => {
                println!(
                    "\n{} installed {}, store has {}",
                    "update available:".yellow().bold(),
                    manifest.version,
                    descriptor.version
                );
            }
            Ok(manifest) => {
                println!("\n{} version {}", "installed:".green().bold(), manifest.version);
            }
            Err(_) => println!("\nnot installed"),
        }
        Ok(())
    }
}
