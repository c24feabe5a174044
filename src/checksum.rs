//! Streaming checksum verification for downloaded bundles.
//!
//! [`ChecksumVerifier`] digests a file in fixed-size chunks (bundles may be
//! large, so nothing is ever buffered whole) and compares the result against
//! the digest a catalog descriptor declares. The comparison is
//! case-insensitive because registries publish hex digests in both cases.
//!
//! Verification **fails closed**: any read error counts as a verification
//! failure, never as success. The verifier never mutates the file it reads.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kiosk::checksum::{ChecksumAlgorithm, ChecksumVerifier};
//! use std::path::Path;
//!
//! # async fn example() -> kiosk::core::Result<()> {
//! let digest =
//!     ChecksumVerifier::compute(Path::new("bundle.zip"), ChecksumAlgorithm::Sha256).await?;
//! println!("sha256:{digest}");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use sha2::{Digest, Sha256, Sha512};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::constants::CHECKSUM_BUF_SIZE;
use crate::core::{KioskError, Result};
use crate::models::Checksum;

/// Digest algorithm named by the tag portion of a `<algo>:<hex>` checksum.
///
/// Descriptors always carry an explicit algorithm identifier; an unknown tag
/// is a typed error at parse time rather than a silent sha256 assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    /// SHA-256, the algorithm every known registry publishes today.
    Sha256,
    /// SHA-512, accepted for registries that prefer the longer digest.
    Sha512,
}

impl ChecksumAlgorithm {
    /// The wire-format tag for this algorithm.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(KioskError::UnsupportedChecksum {
                algorithm: other.to_string(),
            }),
        }
    }
}

/// Computes and verifies content digests over staged bundle files.
///
/// Pure and stateless: both operations stream the file and leave it
/// untouched.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Compute the hex-encoded digest of a file with the given algorithm.
    ///
    /// Streams the file in [`CHECKSUM_BUF_SIZE`] chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub async fn compute(path: &Path, algorithm: ChecksumAlgorithm) -> Result<String> {
        debug!("computing {algorithm} digest for {}", path.display());
        match algorithm {
            ChecksumAlgorithm::Sha256 => digest_file::<Sha256>(path).await,
            ChecksumAlgorithm::Sha512 => digest_file::<Sha512>(path).await,
        }
    }

    /// Verify a file against an expected checksum.
    ///
    /// Returns `true` only when the file was read completely and its digest
    /// matches `expected` (case-insensitively). Read errors are logged and
    /// reported as `false` — a file that cannot be digested is never trusted.
    pub async fn verify(path: &Path, expected: &Checksum) -> bool {
        match Self::compute(path, expected.algorithm).await {
            Ok(actual) => actual.eq_ignore_ascii_case(&expected.digest),
            Err(err) => {
                warn!(
                    "failed to digest {} during verification: {err}",
                    path.display()
                );
                false
            }
        }
    }
}

async fn digest_file<D: Digest>(path: &Path) -> Result<String> {
    let mut file = File::open(path).await?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; CHECKSUM_BUF_SIZE];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
