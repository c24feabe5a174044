//! Cross-cutting utilities: filesystem helpers and CLI progress rendering.

pub mod fs;
pub mod progress;
