//! Archive extraction into a container root.
//!
//! The archive's directory structure, file modes (including set-uid and
//! set-gid bits) and modification times are reproduced under the target.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use corral_common::error::{CorralError, Result};

/// First two bytes of every gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Extracts a tar archive into `target`, which must already exist.
///
/// Gzip-compressed archives are detected by content, not by extension.
///
/// # Errors
///
/// Returns `CorralError::Extraction` if the archive cannot be opened, is
/// corrupt, or an entry cannot be written.
pub fn extract_archive(archive_path: &Path, target: &Path) -> Result<()> {
    tracing::info!(
        archive = %archive_path.display(),
        target = %target.display(),
        "extracting archive"
    );
    let extraction_error = |source| CorralError::Extraction {
        archive: archive_path.to_path_buf(),
        target: target.to_path_buf(),
        source,
    };

    let file = File::open(archive_path).map_err(extraction_error)?;
    let mut reader = BufReader::new(file);
    let is_gzip = reader.fill_buf().map_err(extraction_error)?.starts_with(&GZIP_MAGIC);

    let unpacked = if is_gzip {
        unpack(flate2::bufread::GzDecoder::new(reader), target)
    } else {
        unpack(reader, target)
    };
    unpacked.map_err(extraction_error)?;

    tracing::info!(target = %target.display(), gzip = is_gzip, "archive extracted");
    Ok(())
}

fn unpack<R: Read>(reader: R, target: &Path) -> std::io::Result<()> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);
    archive.unpack(target)
}
