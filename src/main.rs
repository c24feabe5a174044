//! Kiosk CLI entry point.
//!
//! Parses arguments, initializes tracing (respecting `RUST_LOG`, defaulting
//! from the verbosity flags), runs the selected command, and renders
//! failures on stderr.

use clap::Parser;
use colored::Colorize;
use kiosk::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.execute().await {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
