use crate::error::RotateError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive lock covering one file's whole open-write-close-reopen-verify-
/// delete cycle against an archive. Taken on a `<archive>.lock` sidecar so
/// the archive itself can be freely opened and closed while the cycle runs.
#[derive(Debug)]
pub struct ArchiveLock {
    file: File,
    path: PathBuf,
}

impl ArchiveLock {
    pub fn acquire(archive_path: &Path) -> Result<Self, RotateError> {
        let mut name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "archive".to_string());
        name.push_str(".lock");
        let path = archive_path.with_file_name(name);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| RotateError::ArchiveUnwritable {
                path: path.clone(),
                source,
            })?;
        file.lock_exclusive()
            .map_err(|source| RotateError::ArchiveUnwritable {
                path: path.clone(),
                source,
            })?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArchiveLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}
