//! Launch defaults for the corral CLI.
//!
//! The library crates never read this; the CLI folds it together with flags
//! and environment variables into a [`ContainerSpec`](crate::types::ContainerSpec).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONTAINER_DIR, DEFAULT_IMAGE_DIR, DEFAULT_IMAGE_NAME};
use crate::error::{CorralError, Result};

/// Defaults applied when a launch does not name them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorralConfig {
    /// Image used when `--image-name` is absent.
    pub image_name: String,
    /// Directory holding image archives.
    pub image_dir: PathBuf,
    /// Base directory for container roots.
    pub container_dir: PathBuf,
}

impl Default for CorralConfig {
    fn default() -> Self {
        Self {
            image_name: DEFAULT_IMAGE_NAME.to_owned(),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            container_dir: PathBuf::from(DEFAULT_CONTAINER_DIR),
        }
    }
}

impl CorralConfig {
    /// Loads a JSON config file. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `CorralError::Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CorralError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        serde_json::from_str(&content).map_err(|e| CorralError::Config {
            message: format!("cannot parse {}: {e}", path.display()),
        })
    }
}
