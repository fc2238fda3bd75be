use crate::error::RotateError;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Re-open the archive read-only and compare the named entry's content
/// byte-for-byte against `expected`.
///
/// This is a fresh read from disk, never a comparison against what was just
/// held in memory by the writer — it guards against silent write
/// corruption. A missing entry counts as a mismatch.
pub fn verify_entry(
    archive_path: &Path,
    entry_name: &str,
    expected: &[u8],
) -> Result<bool, RotateError> {
    let handle = File::open(archive_path)?;
    let mut archive = ZipArchive::new(handle)?;

    let mut entry = match archive.by_name(entry_name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(false),
        Err(err) => return Err(err.into()),
    };

    let mut got = Vec::with_capacity(expected.len());
    entry.read_to_end(&mut got)?;
    Ok(got == expected)
}
