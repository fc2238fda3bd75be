use crate::error::RotateError;
use crate::rotate::select::LogFile;
use std::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimStatus {
    /// Source removed after an exact content match.
    Deleted,
    /// Source removed via the zero-length shortcut: nothing to compare, and
    /// its (empty) entry exists in the archive.
    DeletedEmpty,
    /// Verification did not pass; source stays for the next run.
    Kept,
}

/// Delete the source file iff verification matched, or the source was
/// zero-length at capture time. Callers only reach this after the archive
/// entry was written or found already present, so the empty shortcut never
/// deletes a source without an entry backing it.
pub fn reclaim_source(file: &LogFile, verified: bool) -> Result<ReclaimStatus, RotateError> {
    if verified {
        fs::remove_file(&file.path)?;
        return Ok(ReclaimStatus::Deleted);
    }
    if file.len == 0 {
        fs::remove_file(&file.path)?;
        return Ok(ReclaimStatus::DeletedEmpty);
    }
    Ok(ReclaimStatus::Kept)
}
