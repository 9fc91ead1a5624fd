//! Pseudo-filesystem mounts inside a container root.
//!
//! Handles mounting `/proc`, `/sys` and a `tmpfs` for `/dev` under the
//! extracted root, after detaching the host's mount propagation.

use std::path::{Path, PathBuf};

use corral_common::error::{CorralError, Result};

/// A container root whose pseudo-filesystems are mounted.
///
/// Only [`mount_namespace`] creates one, so holding a `MountedRoot` means
/// `/dev` is already a `tmpfs` and device nodes may be created in it.
#[derive(Debug)]
pub struct MountedRoot {
    root: PathBuf,
}

impl MountedRoot {
    /// Returns the container root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Returns `<root>/dev`.
    #[must_use]
    pub fn dev_dir(&self) -> PathBuf {
        self.root.join("dev")
    }

    /// Wraps a root whose mounts were set up by other means.
    pub(crate) fn assume_mounted(root: PathBuf) -> Self {
        Self { root }
    }
}

/// One pseudo-filesystem mounted into every container.
#[derive(Debug, Clone, Copy)]
pub struct PseudoFs {
    /// Filesystem type passed to `mount(2)`; also used as the source.
    pub fstype: &'static str,
    /// Mount point relative to the container root.
    pub target: &'static str,
    /// Mount data, if any.
    pub data: Option<&'static str>,
    /// Whether set-uid/set-gid bits are ignored and atime is strict.
    pub hardened: bool,
}

/// Filesystems mounted by [`mount_namespace`], in mount order.
pub const PSEUDO_FILESYSTEMS: [PseudoFs; 3] = [
    PseudoFs {
        fstype: "proc",
        target: "proc",
        data: None,
        hardened: false,
    },
    PseudoFs {
        fstype: "sysfs",
        target: "sys",
        data: None,
        hardened: false,
    },
    PseudoFs {
        fstype: "tmpfs",
        target: "dev",
        data: Some("mode=755"),
        hardened: true,
    },
];

/// Detaches mount propagation and mounts the pseudo-filesystems in `root`.
///
/// The propagation change always comes first. A failed mount aborts the
/// sequence; mounts that already succeeded are left in place.
///
/// # Errors
///
/// Returns `CorralError::Mount` naming the filesystem that failed.
pub fn mount_namespace(root: &Path) -> Result<MountedRoot> {
    tracing::info!(rootfs = %root.display(), "mounting pseudo-filesystems");
    crate::namespace::mount::make_root_private()?;

    for fs in &PSEUDO_FILESYSTEMS {
        mount_pseudo(root, fs)?;
    }
    Ok(MountedRoot::assume_mounted(root.to_path_buf()))
}

#[cfg(target_os = "linux")]
fn mount_pseudo(root: &Path, fs: &PseudoFs) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    let target = root.join(fs.target);
    let flags = if fs.hardened {
        MsFlags::MS_NOSUID | MsFlags::MS_STRICTATIME
    } else {
        MsFlags::empty()
    };
    mount(Some(fs.fstype), &target, Some(fs.fstype), flags, fs.data).map_err(|e| {
        CorralError::Mount {
            fstype: fs.fstype.into(),
            target: target.clone(),
            source: e.into(),
        }
    })?;
    tracing::debug!(fstype = fs.fstype, target = %target.display(), "mounted");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn mount_pseudo(root: &Path, fs: &PseudoFs) -> Result<()> {
    Err(CorralError::Mount {
        fstype: fs.fstype.into(),
        target: root.join(fs.target),
        source: std::io::Error::from(std::io::ErrorKind::Unsupported),
    })
}

/// Mounts the pseudo-terminal filesystem at `target`.
///
/// # Errors
///
/// Returns `CorralError::Mount` if `mount(2)` fails.
#[cfg(target_os = "linux")]
pub fn mount_devpts(target: &Path) -> Result<()> {
    use nix::mount::{MsFlags, mount};

    mount(
        Some("devpts"),
        target,
        Some("devpts"),
        MsFlags::empty(),
        None::<&str>,
    )
    .map_err(|e| CorralError::Mount {
        fstype: "devpts".into(),
        target: target.to_path_buf(),
        source: e.into(),
    })?;
    tracing::debug!(target = %target.display(), "mounted devpts");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: `devpts` requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn mount_devpts(target: &Path) -> Result<()> {
    Err(CorralError::Mount {
        fstype: "devpts".into(),
        target: target.to_path_buf(),
        source: std::io::Error::from(std::io::ErrorKind::Unsupported),
    })
}
