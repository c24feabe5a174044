//! Command-line interface for the kiosk engine.
//!
//! Each subcommand lives in its own module with a clap-derived command
//! struct and an `execute` method, keeping argument parsing and behavior
//! testable per command:
//!
//! - `list` — installed apps from the local registry
//! - `search` — substring search over the store registry
//! - `info` — one app's catalog metadata plus its local install state
//! - `install` — resumable download + verify + unpack (Ctrl-C pauses; the
//!   next `install` resumes from the staging file)
//! - `uninstall` — remove an app and its manifest
//! - `outdated` — installed apps whose catalog version differs
//!
//! The CLI is the engine's reference consumer: it builds a [`StoreConfig`]
//! from the environment, wires progress events into a terminal bar, and
//! maps Ctrl-C onto the cooperative [`CancelToken`](crate::transfer::CancelToken).

mod info;
mod install;
mod list;
mod outdated;
mod search;
mod uninstall;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::StoreConfig;

/// Top-level argument parser for the `kiosk` binary.
#[derive(Parser)]
#[command(name = "kiosk", version, about = "Client-side app store engine")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress everything except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed apps.
    List(list::ListCommand),
    /// Search the store registry.
    Search(search::SearchCommand),
    /// Show one app's metadata and install state.
    Info(info::InfoCommand),
    /// Download, verify, and install an app.
    Install(install::InstallCommand),
    /// Remove an installed app.
    Uninstall(uninstall::UninstallCommand),
    /// List installed apps with a different version in the store.
    Outdated(outdated::OutdatedCommand),
}

impl Cli {
    /// Default tracing filter derived from the verbosity flags, used when
    /// `RUST_LOG` is not set.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "kiosk=debug"
        } else {
            "kiosk=warn"
        }
    }

    /// Execute the selected subcommand against the environment-derived
    /// configuration.
    pub async fn execute(self) -> Result<()> {
        let config = StoreConfig::new()?;
        match self.command {
            Commands::List(cmd) => cmd.execute(config),
            Commands::Search(cmd) => cmd.execute(config).await,
            Commands::Info(cmd) => cmd.execute(config).await,
            Commands::Install(cmd) => cmd.execute(config).await,
            Commands::Uninstall(cmd) => cmd.execute(config).await,
            Commands::Outdated(cmd) => cmd.execute(config).await,
        }
    }
}
