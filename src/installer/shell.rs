//! Shell-integration capability seam.
//!
//! Creating launch shortcuts, Start-Menu entries, or desktop files is a
//! platform side effect that lives with the embedding shell, not in this
//! engine. The installer only knows the [`ShellIntegrator`] trait and calls
//! it best-effort: a failed shortcut never fails an otherwise successful
//! install, and a failed teardown never blocks an uninstall.

use std::path::Path;

use crate::core::Result;
use crate::models::InstalledManifest;

/// Injected capability for platform launch-entry management.
///
/// Implementations must be `Send + Sync`; the installer invokes them from
/// its worker task after the manifest is written (register) or before the
/// app directory is removed (teardown).
pub trait ShellIntegrator: Send + Sync {
    /// Create or refresh a platform launch entry for an installed app.
    ///
    /// `entry` is the resolved absolute path of the app's entry point.
    fn register_launcher(&self, manifest: &InstalledManifest, entry: &Path) -> Result<()>;

    /// Remove the platform launch entry for an app being uninstalled.
    fn remove_launcher(&self, manifest: &InstalledManifest) -> Result<()>;
}

/// Shell integrator that does nothing.
///
/// The default for tests, headless use, and platforms without a shell
/// integration story.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopShellIntegrator;

impl ShellIntegrator for NoopShellIntegrator {
    fn register_launcher(&self, _manifest: &InstalledManifest, _entry: &Path) -> Result<()> {
        Ok(())
    }

    fn remove_launcher(&self, _manifest: &InstalledManifest) -> Result<()> {
        Ok(())
    }
}
