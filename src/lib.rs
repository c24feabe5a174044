//! Kiosk — a client-side app store engine.
//!
//! Kiosk acquires application bundles described by a remote catalog, fetches
//! them over an unreliable network with byte-range resumption, verifies
//! their integrity, materializes them atomically into a local application
//! tree, and tracks installed-version state for update checks. Window
//! chrome, shortcut creation, and process launching belong to the embedding
//! shell; this crate is the engine underneath, with a thin `kiosk` CLI as
//! its reference consumer.
//!
//! # Architecture
//!
//! Data flows through five components, leaves first:
//!
//! - [`catalog`] — time-bounded read-through cache over the store's JSON
//!   endpoints, serving stale documents when the network fails.
//! - [`transfer`] — byte-range-aware HTTP fetch into a staging file, with
//!   resumption after partial failure and cooperative cancellation.
//! - [`checksum`] — streaming digest computation and fail-closed
//!   verification of staged bundles.
//! - [`installer`] — the orchestrator: stage → verify → unpack → write
//!   manifest, owning atomicity, rollback, and the per-app-id concurrency
//!   guarantee.
//! - [`registry`] — answers "is X installed" and "is a newer version
//!   available" from the per-app manifests the installer writes.
//!
//! # On-disk model
//!
//! Each installed app owns `apps/<id>/` containing the unpacked bundle plus
//! `manifest.json`, the sole authority for installation state. A parallel
//! scratch directory holds in-flight staging files (whose length is the
//! resume offset) and cached catalog documents; it is reconstructible from
//! the catalog and safe to purge whenever no operation is in flight.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kiosk::catalog::CatalogClient;
//! use kiosk::config::StoreConfig;
//! use kiosk::installer::{shell::NoopShellIntegrator, BundleInstaller};
//! use kiosk::transfer::CancelToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = StoreConfig::new()?;
//! let catalog = CatalogClient::new(config.clone())?;
//! let installer = BundleInstaller::new(config, Arc::new(NoopShellIntegrator))?;
//!
//! let descriptor = catalog.fetch_app("metro-weather").await?;
//! installer.install(&descriptor, None, &CancelToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod checksum;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod installer;
pub mod models;
pub mod registry;
pub mod transfer;
pub mod utils;
