//! List installed apps from the local registry.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::StoreConfig;
use crate::registry::InstallRegistry;

/// Arguments for `kiosk list`.
#[derive(Args)]
pub struct ListCommand {
    /// Print ids only, one per line (for scripting).
    #[arg(long)]
    ids: bool,
}

impl ListCommand {
    /// Print all installed apps.
    pub fn execute(self, config: StoreConfig) -> Result<()> {
        let registry = InstallRegistry::new(config);
        let installed = registry.list_installed()?;

        if self.ids {
            for manifest in &installed {
                println!("{}", manifest.id);
            }
            return Ok(());
        }

        if installed.is_empty() {
            println!("No apps installed.");
            return Ok(());
        }

        for manifest in &installed {
            println!(
                "{} {} {}",
                manifest.name.bold(),
                manifest.version.cyan(),
                format!("({})", manifest.id).dimmed()
            );
            if !manifest.description.is_empty() {
                println!("  {}", manifest.description.dimmed());
            }
        }
        println!("\n{} app(s) installed", installed.len());
        Ok(())
    }
}
