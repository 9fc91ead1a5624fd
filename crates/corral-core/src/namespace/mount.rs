//! Mount namespace isolation.
//!
//! Gives the container its own mount table, enabling private filesystem views.

use std::path::Path;

use corral_common::error::{CorralError, Result};

/// Marks the host's root mount private, recursively.
///
/// Mounts performed afterwards no longer propagate to or from peer mounts,
/// so this must run before any container mount. Calling it again is harmless.
///
/// # Errors
///
/// Returns `CorralError::Mount` if the `mount(2)` propagation change fails.
#[cfg(target_os = "linux")]
pub fn make_root_private() -> Result<()> {
    use nix::mount::{MsFlags, mount};

    let root = Path::new("/");
    mount(
        None::<&str>,
        root,
        None::<&str>,
        MsFlags::MS_PRIVATE | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| CorralError::Mount {
        fstype: "rprivate".into(),
        target: root.to_path_buf(),
        source: e.into(),
    })?;
    tracing::debug!("root mount propagation set to private");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: mount propagation requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn make_root_private() -> Result<()> {
    Err(CorralError::Mount {
        fstype: "rprivate".into(),
        target: Path::new("/").to_path_buf(),
        source: std::io::Error::from(std::io::ErrorKind::Unsupported),
    })
}

/// Moves the calling process into a new mount namespace.
///
/// Intended for a `pre_exec` hook, so it neither logs nor allocates.
///
/// # Errors
///
/// Returns the OS error from `unshare(CLONE_NEWNS)`.
#[cfg(target_os = "linux")]
pub fn unshare_mount_namespace() -> std::io::Result<()> {
    use nix::sched::{CloneFlags, unshare};

    unshare(CloneFlags::CLONE_NEWNS).map_err(std::io::Error::from)
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns `ErrorKind::Unsupported`.
#[cfg(not(target_os = "linux"))]
pub fn unshare_mount_namespace() -> std::io::Result<()> {
    Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
}
