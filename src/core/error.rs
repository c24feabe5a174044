//! Error handling for the kiosk engine.
//!
//! All library operations return [`KioskError`] so callers can match on the
//! failure category and decide whether to retry, resume, or abandon:
//!
//! - **Network** failures ([`KioskError::Network`],
//!   [`KioskError::IncompleteTransfer`]) are recoverable. Catalog fetches fall
//!   back to a stale cached document when one exists; bundle downloads are
//!   never retried automatically but remain resumable on the next call because
//!   the staging file survives.
//! - **Integrity** failures ([`KioskError::ChecksumMismatch`]) purge the
//!   staging artifact. Retrying with the same bytes would be pointless, so the
//!   caller must start over from the catalog descriptor.
//! - **Not-found** failures ([`KioskError::AppNotFound`],
//!   [`KioskError::EntryNotFound`]) surface directly with the offending id.
//! - **Filesystem** failures ([`KioskError::Filesystem`], [`KioskError::Io`])
//!   are fatal to the current operation but never touch other apps' state:
//!   every app lives under its own id-keyed directory.
//!
//! Cancellation is deliberately *absent* from this enum. Pausing a download is
//! a first-class outcome ([`crate::transfer::TransferOutcome::Cancelled`],
//! [`crate::installer::InstallOutcome::Cancelled`]), not a failure, so that
//! `?` can never accidentally discard a resumable transfer.
//!
//! The CLI layer wraps these in [`anyhow::Error`] with user-facing context;
//! the library itself stays on the typed enum.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kiosk::core::KioskError;
//!
//! fn describe(err: &KioskError) -> &'static str {
//!     match err {
//!         KioskError::Network { .. } => "check your connection and retry",
//!         KioskError::ChecksumMismatch { .. } => "the download was corrupted",
//!         KioskError::InstallInProgress { .. } => "another install is running",
//!         _ => "operation failed",
//!     }
//! }
//! ```

use thiserror::Error;

/// Result alias used throughout the kiosk library.
pub type Result<T, E = KioskError> = std::result::Result<T, E>;

/// The error type for all kiosk engine operations.
///
/// Variants carry enough context (app id, URL, stage) for a caller to choose
/// a recovery strategy without string-matching on messages.
#[derive(Error, Debug)]
pub enum KioskError {
    /// A transport or HTTP status failure during a catalog fetch or bundle
    /// download.
    ///
    /// `status` is `None` when the request never produced a response
    /// (DNS failure, refused connection, timeout).
    #[error("network error fetching {url}: {reason}")]
    Network {
        /// The URL that was being fetched.
        url: String,
        /// HTTP status code, when the server responded at all.
        status: Option<u16>,
        /// Human-readable failure description.
        reason: String,
    },

    /// A download ended with fewer bytes than the server declared.
    ///
    /// Raised before checksum verification so a silently truncated resume
    /// produces a precise, retryable error rather than a misleading
    /// integrity failure. The staging file is kept; the next fetch resumes.
    #[error("incomplete transfer from {url}: expected {expected} bytes, got {actual}")]
    IncompleteTransfer {
        /// The URL that was being fetched.
        url: String,
        /// Byte count the server declared (resume offset + content length).
        expected: u64,
        /// Bytes actually present in the staging file.
        actual: u64,
    },

    /// The downloaded bundle's digest does not match the catalog checksum.
    ///
    /// The staging file has already been deleted when this is returned:
    /// re-invoking install starts a fresh download.
    #[error("checksum mismatch for app '{id}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// App id whose bundle failed verification.
        id: String,
        /// Expected digest from the catalog descriptor.
        expected: String,
        /// Digest actually computed over the staged bytes.
        actual: String,
    },

    /// The descriptor's checksum carries an algorithm tag this build does not
    /// implement.
    #[error("unsupported checksum algorithm '{algorithm}'")]
    UnsupportedChecksum {
        /// The unrecognized algorithm tag.
        algorithm: String,
    },

    /// The descriptor's checksum string is not in `<algorithm>:<hex>` form.
    #[error("malformed checksum '{value}': expected '<algorithm>:<hex-digest>'")]
    MalformedChecksum {
        /// The offending checksum string.
        value: String,
    },

    /// No installed app (or no manifest) exists for the given id.
    #[error("app '{id}' is not installed")]
    AppNotFound {
        /// The app id that was looked up.
        id: String,
    },

    /// An installed app's manifest names an entry point that is missing from
    /// the unpacked tree.
    #[error("entry point for app '{id}' not found: {path}")]
    EntryNotFound {
        /// The app whose entry point is missing.
        id: String,
        /// The resolved path that does not exist.
        path: String,
    },

    /// The app id is not a filesystem-safe token.
    ///
    /// Ids double as installation directory names, so empty ids, path
    /// separators, `..` and dot-leading names are rejected before any disk
    /// path is derived from them.
    #[error("invalid app id '{id}': must be a filesystem-safe token")]
    InvalidAppId {
        /// The rejected id.
        id: String,
    },

    /// Another install or update for the same app id is already running.
    ///
    /// Installs for the same id share a staging file and app directory, so
    /// the engine admits at most one at a time. Distinct ids run freely in
    /// parallel.
    #[error("an install for app '{id}' is already in progress")]
    InstallInProgress {
        /// The contended app id.
        id: String,
    },

    /// A directory creation, removal, unpack, or manifest write failed.
    #[error("filesystem error at {path}: {reason}")]
    Filesystem {
        /// Path involved in the failed operation.
        path: String,
        /// Underlying failure description.
        reason: String,
    },

    /// A catalog or manifest document failed to parse or serialize.
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// Raw I/O error without a more specific categorization.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KioskError {
    /// Build a [`KioskError::Filesystem`] from a path and an underlying error.
    pub fn filesystem(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::Filesystem {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Build a [`KioskError::Network`] from a reqwest error, preserving the
    /// HTTP status when one exists.
    pub fn network(url: impl Into<String>, err: &reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }

    /// Whether the failure is worth retrying from the caller's perspective.
    ///
    /// Network and truncation errors are transient; everything else requires
    /// intervention (fresh descriptor, fixed id, freed directory).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::IncompleteTransfer { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_preserves_context() {
        let err = KioskError::Network {
            url: "https://store.example/index.json".into(),
            status: Some(503),
            reason: "service unavailable".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("index.json"));
        assert!(msg.contains("service unavailable"));
        assert!(err.is_retryable());
    }

    #[test]
    fn integrity_errors_are_not_retryable() {
        let err = KioskError::ChecksumMismatch {
            id: "calc".into(),
            expected: "abc".into(),
            actual: "def".into(),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("calc"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: KioskError = io.into();
        assert!(matches!(err, KioskError::Io(_)));
    }
}
