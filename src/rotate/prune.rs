use crate::error::RotateError;
use crate::rotate::naming;
use crate::rotate::warn::{self, WarnEvent};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct PruneOutcome {
    pub scanned: usize,
    pub pruned: usize,
    pub failed: usize,
    /// Dry-run side-effect descriptions, in scan order.
    pub planned: Vec<String>,
}

/// Delete this root's archives whose last-modified timestamp is strictly
/// earlier than `retain_before`. Pure deletion pass keyed on archive age;
/// content is never inspected. Deletion failures are warned and counted,
/// never fatal.
pub fn prune_archives(
    root: &Path,
    host: &str,
    label: &str,
    retain_before: DateTime<Utc>,
    dry_run: bool,
) -> Result<PruneOutcome, RotateError> {
    if !root.exists() {
        return Err(RotateError::PathNotFound(root.to_path_buf()));
    }

    let mut out = PruneOutcome::default();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !naming::is_archive_name(&name, host, label) {
            continue;
        }
        out.scanned += 1;

        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = meta.modified() else {
            continue;
        };
        if DateTime::<Utc>::from(modified) >= retain_before {
            continue;
        }

        if dry_run {
            out.planned
                .push(format!("would prune archive {}", path.display()));
            out.pruned += 1;
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => out.pruned += 1,
            Err(err) => {
                out.failed += 1;
                warn::emit(WarnEvent {
                    code: "PRUNE_FAILED",
                    stage: "prune",
                    root: &root.display().to_string(),
                    file: &name,
                    archive: &path.display().to_string(),
                    retry: "retry-next-run",
                    err: &err.to_string(),
                });
            }
        }
    }

    Ok(out)
}
