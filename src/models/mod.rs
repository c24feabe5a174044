//! Shared data models for the kiosk engine.
//!
//! Three records flow through the system:
//!
//! - [`AppDescriptor`] — the immutable catalog entry describing one
//!   installable bundle (where to download it, what it must hash to, where
//!   its entry point lives inside the archive).
//! - [`Checksum`] — the descriptor's `<algorithm>:<hex>` integrity claim,
//!   parsed into its tagged form so verification can dispatch on algorithm.
//! - [`InstalledManifest`] — the authoritative local record that an app is
//!   installed and at which version. It exists if and only if the app
//!   directory holds a fully verified, unpacked bundle.
//!
//! Version strings are opaque: two versions are "different" exactly when the
//! strings differ. No semver parsing or ordering is applied anywhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::checksum::ChecksumAlgorithm;
use crate::core::{KioskError, Result};

/// An integrity claim in `<algorithm>:<hex-digest>` wire form.
///
/// Serializes back to the same string, so descriptors round-trip through
/// JSON unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    /// Digest algorithm named by the tag.
    pub algorithm: ChecksumAlgorithm,
    /// Hex-encoded expected digest (case preserved as published).
    pub digest: String,
}

impl FromStr for Checksum {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self> {
        let (tag, digest) = s.split_once(':').ok_or_else(|| KioskError::MalformedChecksum {
            value: s.to_string(),
        })?;
        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(KioskError::MalformedChecksum {
                value: s.to_string(),
            });
        }
        Ok(Self {
            algorithm: tag.parse()?,
            digest: digest.to_string(),
        })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A remote catalog record describing one installable bundle.
///
/// Immutable input from the store: the engine never writes descriptors, it
/// only reads them out of `index.json` / `metadata.json` documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppDescriptor {
    /// Unique store-wide key; doubles as the installation directory name,
    /// so it must be a filesystem-safe token (see [`Self::validate`]).
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Opaque version string, compared for exact equality only.
    pub version: String,
    /// Publisher name.
    #[serde(default)]
    pub author: String,
    /// Short human-readable description.
    #[serde(default)]
    pub description: String,
    /// Absolute URL of the downloadable bundle archive.
    pub download: String,
    /// Integrity claim for the bundle, always tagged with its algorithm.
    pub checksum: Checksum,
    /// Path of the launchable entry point, relative to the unpacked root.
    #[serde(default = "default_entry")]
    pub entry: String,
    /// Optional search tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_entry() -> String {
    "index.html".to_string()
}

impl AppDescriptor {
    /// Reject descriptors whose id cannot safely name a directory.
    ///
    /// Empty ids, path separators, parent references and dot-leading names
    /// are refused before any disk path is ever derived from the id.
    pub fn validate(&self) -> Result<()> {
        validate_app_id(&self.id)
    }
}

/// Check that an app id is a filesystem-safe token.
pub fn validate_app_id(id: &str) -> Result<()> {
    let unsafe_id = id.is_empty()
        || id.starts_with('.')
        || id == ".."
        || id.contains(['/', '\\', ':'])
        || id.chars().any(char::is_control);
    if unsafe_id {
        return Err(KioskError::InvalidAppId { id: id.to_string() });
    }
    Ok(())
}

/// The persisted per-app installation record (`manifest.json`).
///
/// Written only after a bundle has been verified and fully unpacked;
/// overwritten on update; deleted together with the app directory on
/// uninstall. Its presence — not the archive contents — answers
/// "is this app installed, and at which version".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstalledManifest {
    /// App id, primary key and directory name.
    pub id: String,
    /// Display name at install time.
    pub name: String,
    /// Installed version string, compared exactly against catalog versions.
    pub version: String,
    /// Publisher name.
    #[serde(default)]
    pub author: String,
    /// Description at install time.
    #[serde(default)]
    pub description: String,
    /// Entry point path relative to the app directory.
    pub entry: String,
}

impl InstalledManifest {
    /// Derive the manifest that a successful install of `descriptor` writes.
    #[must_use]
    pub fn from_descriptor(descriptor: &AppDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            version: descriptor.version.clone(),
            author: descriptor.author.clone(),
            description: descriptor.description.clone(),
            entry: descriptor.entry.clone(),
        }
    }
}
