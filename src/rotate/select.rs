use crate::error::RotateError;
use crate::rotate::naming;
use chrono::{DateTime, Utc};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One candidate source file, captured from filesystem metadata at
/// selection time. Never persisted.
#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    pub name: String,
    pub modified: DateTime<Utc>,
    pub len: u64,
}

/// Collect regular files under `root` (recursively) whose basename matches
/// `include`, does not match `exclude`, is not one of this root's own
/// archives, and whose last-modified timestamp is strictly earlier than
/// `compress_before`.
///
/// Unreadable directory entries are skipped; they stay candidates for a
/// future run.
pub fn select_files(
    root: &Path,
    include: &Pattern,
    exclude: Option<&Pattern>,
    host: &str,
    label: &str,
    compress_before: DateTime<Utc>,
) -> Result<Vec<LogFile>, RotateError> {
    if !root.exists() {
        return Err(RotateError::PathNotFound(root.to_path_buf()));
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !include.matches(&name) {
            continue;
        }
        if exclude.is_some_and(|pattern| pattern.matches(&name)) {
            continue;
        }
        // Never rotate one of our own archives into itself.
        if naming::is_archive_name(&name, host, label) {
            continue;
        }

        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = meta.modified() else {
            continue;
        };
        let modified = DateTime::<Utc>::from(modified);
        if modified >= compress_before {
            continue;
        }

        out.push(LogFile {
            path: entry.path().to_path_buf(),
            name,
            modified,
            len: meta.len(),
        });
    }

    Ok(out)
}
