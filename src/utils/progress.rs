//! Terminal progress rendering for transfers.
//!
//! Wraps [`indicatif`] so the CLI can feed [`ProgressEvent`]s straight into a
//! bar without caring whether the total size is known yet. Bars disable
//! themselves in non-interactive environments and when `KIOSK_NO_PROGRESS`
//! is set, keeping piped output clean.

use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

use crate::transfer::ProgressEvent;

fn progress_disabled() -> bool {
    std::env::var_os("KIOSK_NO_PROGRESS").is_some()
}

/// A download progress bar driven by typed transfer events.
///
/// Starts as a spinner (byte count only) and upgrades itself to a bounded
/// bar the first time an event carries a total. Servers that omit
/// `Content-Length` simply keep the spinner for the whole transfer.
pub struct TransferBar {
    bar: ProgressBar,
    bounded: AtomicBool,
}

impl TransferBar {
    /// Create a bar labelled with the app being downloaded.
    #[must_use]
    pub fn new(label: &str) -> Self {
        let bar = if progress_disabled() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(label.to_string());
        Self {
            bar,
            bounded: AtomicBool::new(false),
        }
    }

    /// Apply a transfer event to the bar.
    pub fn update(&self, event: ProgressEvent) {
        if let Some(total) = event.total_bytes {
            if !self.bounded.swap(true, Ordering::Relaxed) {
                self.bar.set_length(total);
                self.bar.set_style(
                    ProgressStyle::with_template(
                        "{msg} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
            }
        }
        self.bar.set_position(event.bytes_transferred);
    }

    /// Finish with a closing status line.
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Clear the bar without a closing message (cancelled transfers).
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}
