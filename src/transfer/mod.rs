//! Resumable, cancellable HTTP transfer into a staging file.
//!
//! [`ResumableTransfer`] streams a bundle download into a staging file that
//! lives outside the final install tree. The staging file's length *is* the
//! resume state: a later call picks up where a failed or cancelled transfer
//! stopped by issuing a `Range: bytes=<offset>-` request. No separate
//! bookkeeping file exists, so the staging area is always safe to purge.
//!
//! # Resume protocol
//!
//! 1. An existing staging file sets the resume offset and adds a `Range`
//!    header for the remaining bytes.
//! 2. HTTP 416 ("range not satisfiable") means the staged bytes are stale or
//!    corrupt relative to the resource — they are discarded and a full,
//!    unranged request is issued from zero.
//! 3. A server that ignores the range and replies `200 OK` with the full
//!    body causes the same restart from zero: offset bookkeeping follows the
//!    bytes actually written, never the range that was requested.
//! 4. Any other non-success status is a [`KioskError::Network`] carrying the
//!    status code.
//! 5. When the server declared a content length, the final staging size is
//!    checked against `offset + content_length`; a silently truncated body
//!    surfaces as [`KioskError::IncompleteTransfer`] instead of reaching the
//!    (reliable but less specific) checksum step.
//!
//! # Cancellation
//!
//! Cancellation is cooperative and checked at chunk granularity via
//! [`CancelToken`]. A cancelled transfer returns
//! [`TransferOutcome::Cancelled`] — an outcome, not an error — and leaves
//! the staging file in place so the next call resumes. Appends are the only
//! writes, so stopping between chunks can never corrupt the staged prefix.
//!
//! Progress is reported after every chunk as a typed [`ProgressEvent`]. When
//! the server sends no `Content-Length`, `total_bytes` stays `None` and
//! consumers degrade to a byte counter; that is not an error.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use reqwest::header::RANGE;
use reqwest::StatusCode;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::core::{KioskError, Result};
use crate::utils::fs::{ensure_dir, remove_file_if_exists};

/// Cooperative cancellation handle for in-flight transfers.
///
/// Cheap to clone; all clones observe the same flag. Typically one clone is
/// handed to the transfer worker and another kept by the UI/control side.
///
/// # Examples
///
/// ```rust
/// use kiosk::transfer::CancelToken;
///
/// let token = CancelToken::new();
/// let worker_side = token.clone();
/// token.cancel();
/// assert!(worker_side.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; takes effect at the next chunk
    /// boundary of any transfer holding a clone.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A typed progress report, one per streamed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Total bytes present in the staging file so far (resume offset
    /// included).
    pub bytes_transferred: u64,
    /// Expected final size (`offset + content_length`), or `None` when the
    /// server declared no length.
    pub total_bytes: Option<u64>,
}

/// Progress callback type. Must be safe to invoke from the transfer worker;
/// marshalling onto a UI context is the caller's concern.
pub type ProgressFn<'a> = dyn Fn(ProgressEvent) + Send + Sync + 'a;

/// Terminal state of a single `fetch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The full resource is in the staging file.
    Complete {
        /// Final staging file size in bytes.
        bytes_written: u64,
    },
    /// Cancellation was requested; the staging file holds a resumable
    /// prefix.
    Cancelled {
        /// Staging file size at the point of cancellation.
        bytes_so_far: u64,
    },
}

impl TransferOutcome {
    /// Whether this outcome is the cancelled arm.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Byte-range-aware HTTP fetcher writing into staging files.
///
/// Holds a shared [`reqwest::Client`] configured with per-request connect
/// and read timeouts. Intended to run off the caller's control thread; the
/// installer drives it from its own task.
pub struct ResumableTransfer {
    client: reqwest::Client,
}

impl ResumableTransfer {
    /// Build a transfer engine with the config's request timeouts.
    ///
    /// # Errors
    ///
    /// Fails only when the underlying HTTP client cannot be constructed
    /// (e.g. TLS backend initialization failure).
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| KioskError::Network {
                url: config.store_url.clone(),
                status: None,
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Fetch `url` into `staging`, resuming any partial bytes already there.
    ///
    /// Progress events fire after each chunk; the cancel token is checked
    /// before each chunk is written. See the module docs for the full resume
    /// protocol.
    ///
    /// # Errors
    ///
    /// - [`KioskError::Network`] for transport failures and non-success
    ///   statuses (other than the internally handled 416),
    /// - [`KioskError::IncompleteTransfer`] when the body ends short of the
    ///   server's declared length,
    /// - [`KioskError::Io`] / [`KioskError::Filesystem`] for staging-file
    ///   failures.
    pub async fn fetch(
        &self,
        url: &str,
        staging: &Path,
        on_progress: Option<&ProgressFn<'_>>,
        cancel: &CancelToken,
    ) -> Result<TransferOutcome> {
        let mut offset = match tokio::fs::metadata(staging).await {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };

        let mut request = self.client.get(url);
        if offset > 0 {
            debug!("resuming {url} from byte {offset}");
            request = request.header(RANGE, format!("bytes={offset}-"));
        }
        let mut response = request.send().await.map_err(|e| KioskError::network(url, &e))?;

        // The staged prefix no longer matches the resource (stale or
        // corrupt partial): discard it and refetch from zero.
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            info!("server rejected resume offset {offset} for {url}; restarting from zero");
            remove_file_if_exists(staging)?;
            offset = 0;
            response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| KioskError::network(url, &e))?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(KioskError::Network {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        // A 200 to a ranged request means the server ignored the range and
        // is replaying the full body. Restart bookkeeping from the bytes we
        // actually observe.
        if offset > 0 && status == StatusCode::OK {
            debug!("server ignored range request for {url}; redownloading in full");
            remove_file_if_exists(staging)?;
            offset = 0;
        }

        let expected_total = response.content_length().map(|len| offset + len);

        if let Some(parent) = staging.parent() {
            ensure_dir(parent)?;
        }
        let mut file = if offset > 0 {
            OpenOptions::new().append(true).open(staging).await?
        } else {
            File::create(staging).await?
        };

        let mut written = offset;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| KioskError::network(url, &e))?;
            if cancel.is_cancelled() {
                file.flush().await?;
                info!("transfer of {url} cancelled at {written} bytes (resumable)");
                return Ok(TransferOutcome::Cancelled {
                    bytes_so_far: written,
                });
            }
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if let Some(callback) = on_progress {
                callback(ProgressEvent {
                    bytes_transferred: written,
                    total_bytes: expected_total,
                });
            }
        }
        file.flush().await?;

        if let Some(expected) = expected_total {
            if written != expected {
                return Err(KioskError::IncompleteTransfer {
                    url: url.to_string(),
                    expected,
                    actual: written,
                });
            }
        }

        debug!("transfer of {url} complete: {written} bytes");
        Ok(TransferOutcome::Complete {
            bytes_written: written,
        })
    }
}
