//! Root filesystem switching via `chroot(2)`.
//!
//! Confines the calling process, and every child it starts afterwards,
//! to the container root.

use std::path::Path;

use corral_common::error::{CorralError, Result};

/// Changes the process root to `new_root` and the working directory to `/`.
///
/// The change is irreversible for the calling process.
///
/// # Errors
///
/// Returns `CorralError::Isolation` if `chroot(2)` or `chdir(2)` fails.
pub fn enter_root(new_root: &Path) -> Result<()> {
    tracing::info!(new_root = %new_root.display(), "entering chroot");

    nix::unistd::chroot(new_root).map_err(|e| CorralError::Isolation {
        path: new_root.to_path_buf(),
        source: e.into(),
    })?;
    std::env::set_current_dir("/").map_err(|e| CorralError::Isolation {
        path: Path::new("/").to_path_buf(),
        source: e,
    })?;
    Ok(())
}
