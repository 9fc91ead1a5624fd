//! Container root filesystem materialization.
//!
//! Each container gets `<container_dir>/<id>/rootfs`, filled from the image
//! archive. Distinct IDs keep concurrent roots from touching each other.

use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use corral_common::constants::DIR_MODE;
use corral_common::error::{CorralError, Result};
use corral_common::types::{ContainerInstance, ContainerSpec, Sha256Hash};

/// A freshly extracted container root.
#[derive(Debug, Clone)]
pub struct RootFs {
    /// Path usable as a `chroot` target.
    pub path: PathBuf,
    /// Digest of the archive the root was built from.
    pub image_digest: Sha256Hash,
}

impl RootFs {
    /// Returns the root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Builds the root filesystem for `instance` from the image named in `spec`.
///
/// # Errors
///
/// Returns `CorralError::ImageNotFound` if the archive is missing,
/// `CorralError::Filesystem` if the root directory cannot be created, and
/// `CorralError::Extraction` if unpacking fails or leaves the root empty.
pub fn build_root(spec: &ContainerSpec, instance: &ContainerInstance) -> Result<RootFs> {
    let archive = crate::source::resolve_image(spec)?;
    let root = instance.root_path();
    tracing::info!(id = %instance.id(), rootfs = %root.display(), "creating container root");

    if !root.exists() {
        DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(root)
            .map_err(|e| CorralError::Filesystem {
                path: root.to_path_buf(),
                source: e,
            })?;
    }

    crate::layer::extract_archive(&archive, root)?;
    ensure_populated(&archive, root)?;
    let image_digest = crate::hash::hash_file(&archive)?;
    tracing::info!(id = %instance.short_id(), digest = %image_digest, "container root ready");

    Ok(RootFs {
        path: root.to_path_buf(),
        image_digest,
    })
}

/// Rejects a root that extraction left empty; it cannot be mounted into.
fn ensure_populated(archive: &Path, root: &Path) -> Result<()> {
    let mut entries = std::fs::read_dir(root).map_err(|e| CorralError::Filesystem {
        path: root.to_path_buf(),
        source: e,
    })?;
    if entries.next().is_some() {
        return Ok(());
    }
    Err(CorralError::Extraction {
        archive: archive.to_path_buf(),
        target: root.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "archive contains no entries",
        ),
    })
}
