use crate::rotate::archive::{self, AppendStatus};
use crate::rotate::bucket::{self, MonthGroup};
use crate::rotate::lock::ArchiveLock;
use crate::rotate::naming;
use crate::rotate::prune;
use crate::rotate::reclaim::{self, ReclaimStatus};
use crate::rotate::select::{self, LogFile};
use crate::rotate::verify;
use crate::rotate::warn::{self, WarnEvent};
use crate::rotate::window::RunWindow;
use glob::Pattern;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct RotateRequest<'a> {
    pub roots: &'a [PathBuf],
    pub host: &'a str,
    pub include: &'a Pattern,
    pub exclude: Option<&'a Pattern>,
    pub window: RunWindow,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RotateOutcome {
    pub roots_processed: usize,
    pub roots_missing: Vec<String>,
    pub files_examined: usize,
    pub entries_written: usize,
    pub entries_existing: usize,
    pub verified: usize,
    pub verify_mismatches: usize,
    pub sources_deleted: usize,
    pub sources_kept: usize,
    pub sources_unreadable: usize,
    pub archive_failures: usize,
    pub archives_pruned: usize,
    pub prune_failures: usize,
    /// Dry-run side-effect descriptions, in processing order.
    pub planned: Vec<String>,
}

/// Full rotation pipeline: per root, validate, select, bucket by month,
/// then archive-verify-reclaim each file as one complete cycle before the
/// next file begins. Pruning runs after all compression work for a root.
/// Every failure is local to its file, archive, or root.
pub fn rotate_run(req: &RotateRequest<'_>) -> RotateOutcome {
    let mut out = RotateOutcome::default();

    for root in req.roots {
        if !validate_root(root, &mut out) {
            continue;
        }
        let label = naming::folder_label(root);

        match select::select_files(
            root,
            req.include,
            req.exclude,
            req.host,
            &label,
            req.window.compress_before,
        ) {
            Ok(files) => {
                for group in bucket::bucket_by_month(files) {
                    rotate_group(root, &label, req, &group, &mut out);
                }
            }
            Err(err) => {
                warn::emit(WarnEvent {
                    code: err.code(),
                    stage: "select",
                    root: &root.display().to_string(),
                    file: "-",
                    archive: "-",
                    retry: "retry-next-run",
                    err: &err.to_string(),
                });
            }
        }

        prune_root(root, &label, req.host, req.window, req.dry_run, &mut out);
        out.roots_processed += 1;
    }

    out
}

/// Retention-only pass over the given roots; no compression work.
pub fn prune_run(
    roots: &[PathBuf],
    host: &str,
    window: RunWindow,
    dry_run: bool,
) -> RotateOutcome {
    let mut out = RotateOutcome::default();
    for root in roots {
        if !validate_root(root, &mut out) {
            continue;
        }
        let label = naming::folder_label(root);
        prune_root(root, &label, host, window, dry_run, &mut out);
        out.roots_processed += 1;
    }
    out
}

fn validate_root(root: &Path, out: &mut RotateOutcome) -> bool {
    if root.exists() {
        return true;
    }
    out.roots_missing.push(root.display().to_string());
    warn::emit(WarnEvent {
        code: "PATH_NOT_FOUND",
        stage: "validate",
        root: &root.display().to_string(),
        file: "-",
        archive: "-",
        retry: "skipped",
        err: "root path does not exist",
    });
    false
}

fn rotate_group(
    root: &Path,
    label: &str,
    req: &RotateRequest<'_>,
    group: &MonthGroup,
    out: &mut RotateOutcome,
) {
    let archive_path = root.join(naming::archive_file_name(req.host, label, group.key));

    if req.dry_run {
        plan_group(&archive_path, group, out);
        return;
    }

    for file in &group.files {
        out.files_examined += 1;
        rotate_file(root, &archive_path, file, out);
    }
}

fn plan_group(archive_path: &Path, group: &MonthGroup, out: &mut RotateOutcome) {
    let existing = if archive_path.exists() {
        archive::entry_names(archive_path).unwrap_or_default()
    } else {
        out.planned
            .push(format!("would create archive {}", archive_path.display()));
        Default::default()
    };

    for file in &group.files {
        out.files_examined += 1;
        if existing.contains(&file.name) {
            out.planned.push(format!(
                "would verify {} against its existing entry in {}",
                file.path.display(),
                archive_path.display()
            ));
        } else {
            out.planned.push(format!(
                "would append {} to {}",
                file.path.display(),
                archive_path.display()
            ));
        }
        out.planned.push(format!(
            "would delete source {} after verification",
            file.path.display()
        ));
    }
}

/// One file's complete transaction against its archive: read the source,
/// take the cycle lock, append (or find the entry already present from an
/// interrupted earlier run), re-read and compare, then reclaim. The next
/// file in the group only starts once this cycle has finished.
fn rotate_file(root: &Path, archive_path: &Path, file: &LogFile, out: &mut RotateOutcome) {
    let root_str = root.display().to_string();
    let archive_str = archive_path.display().to_string();

    let contents = match archive::read_source(file) {
        Ok(contents) => contents,
        Err(err) => {
            out.sources_unreadable += 1;
            warn::emit(WarnEvent {
                code: err.code(),
                stage: "read-source",
                root: &root_str,
                file: &file.name,
                archive: &archive_str,
                retry: "retry-next-run",
                err: &err.to_string(),
            });
            return;
        }
    };

    let _lock = match ArchiveLock::acquire(archive_path) {
        Ok(lock) => lock,
        Err(err) => {
            out.archive_failures += 1;
            warn::emit(WarnEvent {
                code: err.code(),
                stage: "lock",
                root: &root_str,
                file: &file.name,
                archive: &archive_str,
                retry: "retry-next-run",
                err: &err.to_string(),
            });
            return;
        }
    };

    match archive::append_entry(archive_path, file, &contents) {
        Ok(AppendStatus::Written) => out.entries_written += 1,
        Ok(AppendStatus::AlreadyPresent) => out.entries_existing += 1,
        Err(err) => {
            out.archive_failures += 1;
            warn::emit(WarnEvent {
                code: err.code(),
                stage: "append",
                root: &root_str,
                file: &file.name,
                archive: &archive_str,
                retry: "retry-next-run",
                err: &err.to_string(),
            });
            return;
        }
    }

    let verified = match verify::verify_entry(archive_path, &file.name, &contents) {
        Ok(verified) => verified,
        Err(err) => {
            warn::emit(WarnEvent {
                code: err.code(),
                stage: "verify",
                root: &root_str,
                file: &file.name,
                archive: &archive_str,
                retry: "retry-next-run",
                err: &err.to_string(),
            });
            false
        }
    };
    if verified {
        out.verified += 1;
    } else if file.len > 0 {
        out.verify_mismatches += 1;
        warn::emit(WarnEvent {
            code: "VERIFICATION_MISMATCH",
            stage: "verify",
            root: &root_str,
            file: &file.name,
            archive: &archive_str,
            retry: "retry-next-run",
            err: "archived entry does not match source",
        });
    }

    match reclaim::reclaim_source(file, verified) {
        Ok(ReclaimStatus::Deleted | ReclaimStatus::DeletedEmpty) => out.sources_deleted += 1,
        Ok(ReclaimStatus::Kept) => out.sources_kept += 1,
        Err(err) => {
            out.sources_kept += 1;
            warn::emit(WarnEvent {
                code: err.code(),
                stage: "reclaim",
                root: &root_str,
                file: &file.name,
                archive: &archive_str,
                retry: "retry-next-run",
                err: &err.to_string(),
            });
        }
    }
}

fn prune_root(
    root: &Path,
    label: &str,
    host: &str,
    window: RunWindow,
    dry_run: bool,
    out: &mut RotateOutcome,
) {
    let Some(retain_before) = window.retain_before else {
        return;
    };

    match prune::prune_archives(root, host, label, retain_before, dry_run) {
        Ok(pruned) => {
            out.archives_pruned += pruned.pruned;
            out.prune_failures += pruned.failed;
            out.planned.extend(pruned.planned);
        }
        Err(err) => {
            out.prune_failures += 1;
            warn::emit(WarnEvent {
                code: err.code(),
                stage: "prune",
                root: &root.display().to_string(),
                file: "-",
                archive: "-",
                retry: "retry-next-run",
                err: &err.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RotateRequest, rotate_run};
    use crate::rotate::window::RunWindow;
    use chrono::{DateTime, Duration, Utc};
    use glob::Pattern;
    use std::fs::{self, File};
    use std::io::Read;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn plant(path: &Path, contents: &[u8], modified: DateTime<Utc>) {
        fs::write(path, contents).expect("write file");
        let file = File::options()
            .write(true)
            .open(path)
            .expect("open for mtime");
        file.set_modified(modified.into()).expect("set mtime");
    }

    fn request<'a>(
        roots: &'a [PathBuf],
        include: &'a Pattern,
        window: RunWindow,
        dry_run: bool,
    ) -> RotateRequest<'a> {
        RotateRequest {
            roots,
            host: "web01",
            include,
            exclude: None,
            window,
            dry_run,
        }
    }

    #[test]
    fn rotates_aged_files_and_removes_sources() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("site1");
        fs::create_dir(&root).expect("mkdir");

        let now = Utc::now();
        let ten_days_ago = now - Duration::days(10);
        plant(&root.join("a.log"), &[b'x'; 120], ten_days_ago);
        plant(&root.join("b.log"), b"", ten_days_ago);

        let roots = vec![root.clone()];
        let include = Pattern::new("*.log").unwrap();
        let window = RunWindow::at(now, 5, None);
        let out = rotate_run(&request(&roots, &include, window, false));

        assert_eq!(out.roots_processed, 1);
        assert_eq!(out.entries_written, 2);
        assert_eq!(out.sources_deleted, 2);
        assert_eq!(out.verify_mismatches, 0);
        assert!(!root.join("a.log").exists());
        assert!(!root.join("b.log").exists());

        let key = format!("{}", ten_days_ago.format("%Y-%m"));
        let archive = root.join(format!("web01-site1-{key}.zip"));
        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut buf = Vec::new();
        zip.by_name("a.log").unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf.len(), 120);
        assert_eq!(zip.by_name("b.log").unwrap().size(), 0);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("site1");
        fs::create_dir(&root).expect("mkdir");

        let now = Utc::now();
        let ten_days_ago = now - Duration::days(10);
        plant(&root.join("a.log"), b"payload", ten_days_ago);

        let roots = vec![root.clone()];
        let include = Pattern::new("*.log").unwrap();
        let window = RunWindow::at(now, 5, None);
        let first = rotate_run(&request(&roots, &include, window, false));
        assert_eq!(first.entries_written, 1);

        let key = format!("{}", ten_days_ago.format("%Y-%m"));
        let archive = root.join(format!("web01-site1-{key}.zip"));
        let before = fs::read(&archive).unwrap();

        let second = rotate_run(&request(&roots, &include, window, false));
        assert_eq!(second.entries_written, 0);
        assert_eq!(second.files_examined, 0);
        assert_eq!(fs::read(&archive).unwrap(), before);
    }

    #[test]
    fn interrupted_run_resumes_via_existing_entry() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("site1");
        fs::create_dir(&root).expect("mkdir");

        let now = Utc::now();
        let ten_days_ago = now - Duration::days(10);
        plant(&root.join("a.log"), b"payload", ten_days_ago);

        let roots = vec![root.clone()];
        let include = Pattern::new("*.log").unwrap();
        let window = RunWindow::at(now, 5, None);
        rotate_run(&request(&roots, &include, window, false));

        // Simulate a crash between "entry written" and "source deleted".
        plant(&root.join("a.log"), b"payload", ten_days_ago);

        let resumed = rotate_run(&request(&roots, &include, window, false));
        assert_eq!(resumed.entries_written, 0);
        assert_eq!(resumed.entries_existing, 1);
        assert_eq!(resumed.sources_deleted, 1);
        assert!(!root.join("a.log").exists());
    }

    #[test]
    fn mismatched_source_is_kept() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("site1");
        fs::create_dir(&root).expect("mkdir");

        let now = Utc::now();
        let ten_days_ago = now - Duration::days(10);
        plant(&root.join("a.log"), b"original", ten_days_ago);

        let roots = vec![root.clone()];
        let include = Pattern::new("*.log").unwrap();
        let window = RunWindow::at(now, 5, None);
        rotate_run(&request(&roots, &include, window, false));

        // The entry now holds "original"; a reborn source with different
        // content must survive the next run.
        plant(&root.join("a.log"), b"changed after rotation", ten_days_ago);

        let out = rotate_run(&request(&roots, &include, window, false));
        assert_eq!(out.entries_existing, 1);
        assert_eq!(out.verify_mismatches, 1);
        assert_eq!(out.sources_kept, 1);
        assert!(root.join("a.log").exists());
    }

    #[test]
    fn missing_root_is_skipped_and_others_continue() {
        let tmp = tempdir().expect("tempdir");
        let present = tmp.path().join("site1");
        fs::create_dir(&present).expect("mkdir");

        let now = Utc::now();
        plant(
            &present.join("a.log"),
            b"payload",
            now - Duration::days(10),
        );

        let roots = vec![tmp.path().join("gone"), present.clone()];
        let include = Pattern::new("*.log").unwrap();
        let window = RunWindow::at(now, 5, None);
        let out = rotate_run(&request(&roots, &include, window, false));

        assert_eq!(out.roots_missing.len(), 1);
        assert_eq!(out.roots_processed, 1);
        assert_eq!(out.sources_deleted, 1);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("site1");
        fs::create_dir(&root).expect("mkdir");

        let now = Utc::now();
        let ten_days_ago = now - Duration::days(10);
        plant(&root.join("a.log"), b"payload", ten_days_ago);

        let roots = vec![root.clone()];
        let include = Pattern::new("*.log").unwrap();
        let window = RunWindow::at(now, 5, Some(6));
        let out = rotate_run(&request(&roots, &include, window, true));

        assert!(root.join("a.log").exists());
        assert!(out.planned.iter().any(|p| p.contains("would append")));
        assert!(
            fs::read_dir(&root)
                .unwrap()
                .filter_map(|e| e.ok())
                .all(|e| e.file_name() == "a.log")
        );
    }
}
