//! SHA-256 content verification.
//!
//! Records which archive a container root was built from.

use std::path::Path;

use corral_common::error::{CorralError, Result};
use corral_common::types::Sha256Hash;
use sha2::{Digest, Sha256};

/// Computes the SHA-256 hash of a file.
///
/// # Errors
///
/// Returns `CorralError::Filesystem` if the file cannot be read.
pub fn hash_file(path: &Path) -> Result<Sha256Hash> {
    tracing::debug!(path = %path.display(), "computing SHA-256 hash");
    let io_error = |source| CorralError::Filesystem {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::fs::File::open(path).map_err(io_error)?;
    let mut hasher = Sha256::new();
    let _ = std::io::copy(&mut file, &mut hasher).map_err(io_error)?;
    Sha256Hash::from_hex(format!("{:x}", hasher.finalize()))
}
