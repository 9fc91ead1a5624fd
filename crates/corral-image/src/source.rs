//! Image archive lookup.
//!
//! Images are plain files named `<image_name>.tar` inside an image
//! directory. They are read-only input and never modified.

use std::path::PathBuf;

use corral_common::error::{CorralError, Result};
use corral_common::types::ContainerSpec;

/// Resolves the image archive named by `spec`.
///
/// # Errors
///
/// Returns `CorralError::ImageNotFound` if the archive does not exist or is
/// not a regular file.
pub fn resolve_image(spec: &ContainerSpec) -> Result<PathBuf> {
    let path = spec.image_path();
    if !path.is_file() {
        return Err(CorralError::ImageNotFound { path });
    }
    tracing::info!(image = %spec.image_name, path = %path.display(), "resolved image archive");
    Ok(path)
}
