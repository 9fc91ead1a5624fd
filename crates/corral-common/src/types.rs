//! Domain primitive types used across the corral workspace.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{IMAGE_SUFFIX, ROOTFS_DIR_NAME};
use crate::error::{CorralError, Result};

/// Unique identifier for a container instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a new container ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a random, UUID-formatted container ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the display fragment of the ID: its fifth hyphen-delimited
    /// segment, or the whole ID when it has fewer segments.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.split('-').nth(4).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable description of one container to launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Executable name followed by its arguments.
    pub entrypoint: Vec<String>,
    /// `KEY=VALUE` strings passed verbatim to the child.
    pub environment: Vec<String>,
    /// Image name; the archive is `<image_dir>/<image_name>.tar`.
    pub image_name: String,
    /// Directory holding image archives.
    pub image_dir: PathBuf,
    /// Base directory for per-container state.
    pub container_dir: PathBuf,
}

impl ContainerSpec {
    /// Checks that the description is launchable.
    ///
    /// # Errors
    ///
    /// Returns `CorralError::Config` if the entrypoint is empty.
    pub fn validate(&self) -> Result<()> {
        match self.entrypoint.first() {
            Some(program) if !program.is_empty() => Ok(()),
            _ => Err(CorralError::Config {
                message: "entrypoint must name an executable".into(),
            }),
        }
    }

    /// Returns the executable name (`entrypoint[0]`).
    #[must_use]
    pub fn program(&self) -> &str {
        self.entrypoint.first().map_or("", String::as_str)
    }

    /// Returns the full path of the image archive.
    #[must_use]
    pub fn image_path(&self) -> PathBuf {
        self.image_dir
            .join(format!("{}.{IMAGE_SUFFIX}", self.image_name))
    }
}

/// Runtime state of one bootstrap sequence.
///
/// Created once per launch; the ID never changes after construction.
#[derive(Debug, Clone)]
pub struct ContainerInstance {
    id: ContainerId,
    root_path: PathBuf,
    created_at: String,
}

impl ContainerInstance {
    /// Creates an instance with a freshly generated ID under `container_dir`.
    #[must_use]
    pub fn create(container_dir: &Path) -> Self {
        Self::with_id(ContainerId::generate(), container_dir)
    }

    /// Creates an instance with a caller-chosen ID.
    #[must_use]
    pub fn with_id(id: ContainerId, container_dir: &Path) -> Self {
        let root_path = container_dir.join(id.as_str()).join(ROOTFS_DIR_NAME);
        Self {
            id,
            root_path,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Returns the container ID.
    #[must_use]
    pub const fn id(&self) -> &ContainerId {
        &self.id
    }

    /// Returns the display-only short ID.
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.short()
    }

    /// Returns `<container_dir>/<id>/rootfs`.
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Returns the RFC 3339 creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// SHA-256 hash digest used for content verification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha256Hash(String);

impl Sha256Hash {
    /// Creates a hash from a hex-encoded string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid 64-character hex string.
    pub fn from_hex(hex: impl Into<String>) -> Result<Self> {
        let hex = hex.into();
        if hex.len() != crate::constants::SHA256_HEX_LENGTH
            || !hex.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(CorralError::Config {
                message: format!("invalid SHA-256 hex string: {hex}"),
            });
        }
        Ok(Self(hex))
    }

    /// Returns the hex-encoded hash string.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.0)
    }
}

/// Lifecycle state of the launched container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerState {
    /// Entrypoint resolved, nothing confined yet.
    Created,
    /// The launcher is jailed inside the container root.
    RootConfined,
    /// The entrypoint process is running.
    Running,
    /// The entrypoint process has terminated.
    Exited,
    /// A transition failed.
    Failed,
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::RootConfined => write!(f, "root-confined"),
            Self::Running => write!(f, "running"),
            Self::Exited => write!(f, "exited"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn spec(entrypoint: &[&str]) -> ContainerSpec {
        ContainerSpec {
            entrypoint: entrypoint.iter().map(ToString::to_string).collect(),
            environment: vec!["PATH=/bin".into()],
            image_name: "alpine".into(),
            image_dir: PathBuf::from("/images"),
            container_dir: PathBuf::from("/containers"),
        }
    }

    #[test]
    fn generated_ids_are_uuid_shaped_and_distinct() {
        let ids: HashSet<String> = (0..64)
            .map(|_| ContainerId::generate().as_str().to_owned())
            .collect();
        assert_eq!(ids.len(), 64);
        for id in &ids {
            assert!(uuid::Uuid::parse_str(id).is_ok(), "not a uuid: {id}");
        }
    }

    #[test]
    fn short_id_is_fifth_segment() {
        let id = ContainerId::new("123e4567-e89b-12d3-a456-426614174000");
        assert_eq!(id.short(), "426614174000");
    }

    #[test]
    fn short_id_falls_back_to_whole_id() {
        assert_eq!(ContainerId::new("plain").short(), "plain");
    }

    #[test]
    fn image_path_appends_tar_suffix() {
        assert_eq!(
            spec(&["sh"]).image_path(),
            PathBuf::from("/images/alpine.tar")
        );
    }

    #[test]
    fn root_path_is_under_container_dir() {
        let id = ContainerId::new("abc");
        let instance = ContainerInstance::with_id(id, Path::new("/containers"));
        assert_eq!(instance.root_path(), Path::new("/containers/abc/rootfs"));
    }

    #[test]
    fn each_instance_gets_its_own_root() {
        let a = ContainerInstance::create(Path::new("/containers"));
        let b = ContainerInstance::create(Path::new("/containers"));
        assert_ne!(a.id(), b.id());
        assert_ne!(a.root_path(), b.root_path());
    }

    #[test]
    fn validate_rejects_empty_entrypoint() {
        assert!(spec(&[]).validate().is_err());
        assert!(spec(&[""]).validate().is_err());
        assert!(spec(&["/bin/sh", "-c", "true"]).validate().is_ok());
    }

    #[test]
    fn program_is_first_entrypoint_element() {
        assert_eq!(spec(&["echo", "hi"]).program(), "echo");
    }

    #[test]
    fn sha256_from_hex_rejects_short_input() {
        assert!(Sha256Hash::from_hex("abc").is_err());
    }

    #[test]
    fn container_state_display() {
        assert_eq!(ContainerState::RootConfined.to_string(), "root-confined");
        assert_eq!(ContainerState::Exited.to_string(), "exited");
    }
}
