//! Global constants used throughout the kiosk codebase.
//!
//! Timeout durations, cache windows, and buffer sizes used across multiple
//! modules. Defining them centrally keeps magic numbers discoverable.

use std::time::Duration;

/// Maximum age before the full registry document (`index.json`) and the
/// featured list are refetched (5 minutes).
pub const REGISTRY_MAX_AGE: Duration = Duration::from_secs(300);

/// Maximum age before a single app's metadata document is refetched
/// (1 minute). Per-app metadata changes more often than the registry
/// listing, e.g. right after a release.
pub const APP_METADATA_MAX_AGE: Duration = Duration::from_secs(60);

/// Connect timeout for every HTTP request (catalog and bundle alike).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read timeout for individual HTTP requests.
///
/// Applies per request, never to the whole multi-chunk transfer: resumable
/// downloads make an overall deadline unnecessary.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffer size for streaming checksum computation (8 KiB).
///
/// Bundles may be large, so files are digested in fixed-size chunks rather
/// than read whole into memory.
pub const CHECKSUM_BUF_SIZE: usize = 8192;

/// File name of the per-app installation manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Extension used for staging files in the cache directory.
pub const STAGING_EXTENSION: &str = "zip";
