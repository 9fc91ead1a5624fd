//! Unified error types for the corral workspace.
//!
//! Every variant is terminal for the current launch: nothing is retried and
//! nothing already mounted or created is rolled back. Each variant carries
//! the path or identifier it failed on, and the OS-level cause is kept as
//! the error source.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CorralError {
    /// The image archive does not exist.
    #[error("image archive not found: {}", path.display())]
    ImageNotFound {
        /// Expected location of the archive.
        path: PathBuf,
    },

    /// A directory could not be created or inspected.
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// Path where the operation failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The image archive could not be read or unpacked.
    #[error("cannot extract {} into {}: {source}", archive.display(), target.display())]
    Extraction {
        /// Archive being extracted.
        archive: PathBuf,
        /// Destination directory.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A `mount(2)` call failed.
    #[error("cannot mount {fstype} at {}: {source}", target.display())]
    Mount {
        /// Filesystem type being mounted (or `/` for the propagation change).
        fstype: String,
        /// Mount point.
        target: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A device node or standard stream link could not be created.
    #[error("cannot create device {name} at {}: {source}", path.display())]
    Device {
        /// Device name (`null`, `stdin`, ...).
        name: String,
        /// Path of the node or link.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The entrypoint could not be resolved on the executable search path.
    #[error("cannot find executable {name}: {reason}")]
    ExecutableNotFound {
        /// Name given as `entrypoint[0]`.
        name: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The `chroot`/`chdir` jail transition failed.
    #[error("cannot confine process to {}: {source}", path.display())]
    Isolation {
        /// Root (or working directory) being entered.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The child process could not be started.
    #[error("cannot run {program}: {source}")]
    Launch {
        /// Resolved program path.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Waiting for the child process failed.
    #[error("error while running process {pid}: {source}")]
    Wait {
        /// PID of the child.
        pid: u32,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value or request is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An error raised inside a named pipeline stage.
    #[error("{stage}")]
    Stage {
        /// Stage that failed.
        stage: Stage,
        /// Error raised by the stage.
        source: Box<CorralError>,
    },
}

impl CorralError {
    /// Wraps this error with the pipeline stage it was raised in.
    #[must_use]
    pub fn in_stage(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any stage wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the stage this error was raised in, if it was wrapped.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Stages of the bootstrap pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Entrypoint lookup on the host search path.
    Resolve,
    /// Root filesystem materialization from the image archive.
    CreateContainer,
    /// Mount propagation change and pseudo-filesystem mounts.
    MountFilesystems,
    /// `/dev/pts`, standard stream links and device nodes.
    ProvisionDevices,
    /// Jail transition, process start and wait.
    Launch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve entrypoint"),
            Self::CreateContainer => write!(f, "create container"),
            Self::MountFilesystems => write!(f, "mount filesystems"),
            Self::ProvisionDevices => write!(f, "provision devices"),
            Self::Launch => write!(f, "launch"),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CorralError>;
