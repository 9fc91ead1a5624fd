//! `/dev` provisioning inside a mounted container root.
//!
//! Creates `/dev/pts` with its own `devpts` mount, links the standard
//! streams to `/proc/self/fd`, and creates the fixed set of character
//! device nodes a userland expects.

use std::fs::{DirBuilder, Permissions};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::Path;

use corral_common::constants::{DEVICE_MODE, DIR_MODE};
use corral_common::error::{CorralError, Result};

use super::mount::MountedRoot;

/// A character device node created under `/dev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceNode {
    /// File name under `/dev`.
    pub name: &'static str,
    /// Device major number.
    pub major: u64,
    /// Device minor number.
    pub minor: u64,
}

/// Character devices created in every container, in creation order.
#[rustfmt::skip]
pub const DEVICE_NODES: [DeviceNode; 7] = [
    DeviceNode { name: "null", major: 1, minor: 3 },
    // TODO: confirm against the target kernel; devices.txt assigns `zero` 1:5.
    DeviceNode { name: "zero", major: 1, minor: 3 },
    DeviceNode { name: "random", major: 1, minor: 8 },
    DeviceNode { name: "urandom", major: 1, minor: 9 },
    DeviceNode { name: "console", major: 136, minor: 1 },
    DeviceNode { name: "tty", major: 5, minor: 0 },
    DeviceNode { name: "full", major: 1, minor: 7 },
];

/// Standard stream links: `/dev/<name>` -> `/proc/self/fd/<fd>`.
pub const STD_STREAMS: [(&str, u8); 3] = [("stdin", 0), ("stdout", 1), ("stderr", 2)];

/// Populates `/dev` of a mounted container root.
///
/// # Errors
///
/// Returns `CorralError::Filesystem` if `/dev/pts` cannot be created,
/// `CorralError::Mount` if `devpts` cannot be mounted, and
/// `CorralError::Device` naming the link or node that failed.
pub fn provision_devices(root: &MountedRoot) -> Result<()> {
    let dev = root.dev_dir();
    tracing::info!(dev = %dev.display(), "provisioning devices");

    let pts = dev.join("pts");
    create_dir_if_absent(&pts)?;
    super::mount::mount_devpts(&pts)?;

    link_std_streams(&dev)?;
    for node in &DEVICE_NODES {
        create_device_node(&dev, node)?;
    }
    tracing::debug!(count = DEVICE_NODES.len(), "device nodes created");
    Ok(())
}

fn create_dir_if_absent(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    DirBuilder::new()
        .mode(DIR_MODE)
        .create(path)
        .map_err(|e| CorralError::Filesystem {
            path: path.to_path_buf(),
            source: e,
        })
}

fn link_std_streams(dev: &Path) -> Result<()> {
    for (name, fd) in STD_STREAMS {
        let link = dev.join(name);
        std::os::unix::fs::symlink(format!("/proc/self/fd/{fd}"), &link).map_err(|e| {
            CorralError::Device {
                name: name.into(),
                path: link.clone(),
                source: e,
            }
        })?;
    }
    Ok(())
}

fn create_device_node(dev: &Path, node: &DeviceNode) -> Result<()> {
    use nix::sys::stat::{Mode, SFlag, makedev, mknod};

    let path = dev.join(node.name);
    let device_error = |source: std::io::Error| CorralError::Device {
        name: node.name.into(),
        path: path.clone(),
        source,
    };

    mknod(
        &path,
        SFlag::S_IFCHR,
        Mode::from_bits_truncate(DEVICE_MODE),
        makedev(node.major, node.minor),
    )
    .map_err(|e| device_error(e.into()))?;
    // mknod honours the umask
    std::fs::set_permissions(&path, Permissions::from_mode(DEVICE_MODE))
        .map_err(device_error)?;

    tracing::debug!(device = node.name, major = node.major, minor = node.minor, "created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> DeviceNode {
        *DEVICE_NODES
            .iter()
            .find(|n| n.name == name)
            .expect("device in table")
    }

    #[test]
    fn device_table_has_seven_distinct_names() {
        let mut names: Vec<_> = DEVICE_NODES.iter().map(|n| n.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn null_and_zero_share_numbers() {
        assert_eq!((node("null").major, node("null").minor), (1, 3));
        assert_eq!((node("zero").major, node("zero").minor), (1, 3));
    }

    #[test]
    fn remaining_device_numbers() {
        assert_eq!((node("random").major, node("random").minor), (1, 8));
        assert_eq!((node("urandom").major, node("urandom").minor), (1, 9));
        assert_eq!((node("console").major, node("console").minor), (136, 1));
        assert_eq!((node("tty").major, node("tty").minor), (5, 0));
        assert_eq!((node("full").major, node("full").minor), (1, 7));
    }

    #[test]
    fn std_streams_link_to_proc_fds() {
        let dir = tempfile::tempdir().expect("tempdir");
        link_std_streams(dir.path()).expect("link");

        for (name, fd) in STD_STREAMS {
            let target = std::fs::read_link(dir.path().join(name)).expect("readlink");
            assert_eq!(target, Path::new(&format!("/proc/self/fd/{fd}")));
        }
    }

    #[test]
    fn std_stream_link_collision_is_device_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("stdout"), b"").expect("write");

        let err = link_std_streams(dir.path()).expect_err("stdout exists");
        assert!(matches!(err, CorralError::Device { ref name, .. } if name == "stdout"));
    }

    #[test]
    fn pts_dir_is_created_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pts = dir.path().join("pts");
        create_dir_if_absent(&pts).expect("create");
        create_dir_if_absent(&pts).expect("second call is a no-op");
        assert!(pts.is_dir());
    }

    #[test]
    fn pts_dir_under_missing_parent_is_filesystem_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pts = dir.path().join("missing").join("pts");
        let err = create_dir_if_absent(&pts).expect_err("parent missing");
        assert!(matches!(err, CorralError::Filesystem { .. }));
    }
}
