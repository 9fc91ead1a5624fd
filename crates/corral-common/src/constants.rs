//! System-wide constants and default paths.

/// Image name used when none is given.
pub const DEFAULT_IMAGE_NAME: &str = "ubuntu";

/// Directory searched for `<image>.tar` archives when none is given.
pub const DEFAULT_IMAGE_DIR: &str = "/workshop/images";

/// Base directory under which container roots are materialized.
pub const DEFAULT_CONTAINER_DIR: &str = "/workshop/containers";

/// File extension of image archives.
pub const IMAGE_SUFFIX: &str = "tar";

/// Name of the root filesystem directory inside a container directory.
pub const ROOTFS_DIR_NAME: &str = "rootfs";

/// Permission bits for directories created by corral.
pub const DIR_MODE: u32 = 0o755;

/// Permission bits for character device nodes.
pub const DEVICE_MODE: u32 = 0o666;

/// SHA-256 digest length in hex characters.
pub const SHA256_HEX_LENGTH: usize = 64;
