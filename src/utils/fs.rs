//! Filesystem helpers used by the installer, registry, and catalog cache.
//!
//! Manifest and cache documents are written atomically (temp file in the
//! destination directory, then rename) so a crash mid-write can never leave
//! a half-written JSON file behind to be mistaken for a real record.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::{KioskError, Result};

/// Ensure a directory exists, creating it and all parents if necessary.
///
/// # Errors
///
/// Fails when creation fails or when the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(KioskError::filesystem(
            path,
            "path exists but is not a directory",
        ));
    }
    std::fs::create_dir_all(path).map_err(|e| KioskError::filesystem(path, e))
}

/// Atomically write raw bytes to `path`.
///
/// Writes to a temp file in the same directory and renames it into place;
/// rename within one directory is atomic on every supported platform.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| KioskError::filesystem(path, "path has no parent directory"))?;
    ensure_dir(dir)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let tmp = dir.join(format!(".{file_name}.tmp"));

    std::fs::write(&tmp, content).map_err(|e| KioskError::filesystem(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        KioskError::filesystem(path, e)
    })
}

/// Atomically serialize `value` to `path` as pretty-printed JSON.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json)
}

/// Read and deserialize a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|e| KioskError::filesystem(path, e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Remove a directory tree, mapping failures to a contextual error.
///
/// Missing directories are fine: removal is idempotent.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(KioskError::filesystem(path, e)),
    }
}

/// Remove a file if it exists.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(KioskError::filesystem(path, e)),
    }
}
