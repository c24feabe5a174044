//! Core types shared across the kiosk engine.
//!
//! Currently this is the error module; see [`error`] for the full failure
//! taxonomy and recovery guidance.

pub mod error;

pub use error::{KioskError, Result};
