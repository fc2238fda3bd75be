use crate::commands::CommandReport;
use crate::rotate::config::load_config;
use crate::rotate::naming;
use crate::rotate::run::{RotateRequest, rotate_run};
use crate::rotate::window::RunWindow;
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RotateArgs {
    /// Root directories to rotate.
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,
    /// Basename glob selecting candidates (default: *.log).
    #[arg(long)]
    pub include: Option<String>,
    /// Basename glob excluding candidates.
    #[arg(long)]
    pub exclude: Option<String>,
    /// Archive files older than this many days.
    #[arg(long)]
    pub compress_after_days: Option<u32>,
    /// Prune archives older than this many months (0 retains forever).
    #[arg(long)]
    pub retain_months: Option<u32>,
    /// Describe every side effect instead of performing it.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &RotateArgs) -> Result<CommandReport> {
    let mut cfg = load_config()?;
    if let Some(include) = &args.include {
        cfg.rotate.include = include.clone();
    }
    if let Some(exclude) = &args.exclude {
        cfg.rotate.exclude = exclude.clone();
    }
    if let Some(days) = args.compress_after_days {
        anyhow::ensure!(days >= 1, "invalid --compress-after-days: must be >= 1");
        cfg.rotate.compress_after_days = days;
    }
    if let Some(months) = args.retain_months {
        cfg.rotate.retain_months = months;
    }

    let include = cfg.include_pattern()?;
    let exclude = cfg.exclude_pattern()?;
    let host = naming::host_label()?;
    let window = RunWindow::at(Utc::now(), cfg.rotate.compress_after_days, cfg.retain_months());

    let outcome = rotate_run(&RotateRequest {
        roots: &args.roots,
        host: &host,
        include: &include,
        exclude: exclude.as_ref(),
        window,
        dry_run: args.dry_run,
    });

    let mut report = CommandReport::new(if args.dry_run { "rotate (dry-run)" } else { "rotate" });
    report.detail(format!("host={host}"));
    report.detail(format!(
        "compress_before={}",
        window.compress_before.to_rfc3339()
    ));
    if let Some(retain_before) = window.retain_before {
        report.detail(format!("retain_before={}", retain_before.to_rfc3339()));
    }
    report.detail(format!("roots_processed={}", outcome.roots_processed));
    report.detail(format!("files_examined={}", outcome.files_examined));
    report.detail(format!("entries_written={}", outcome.entries_written));
    report.detail(format!("entries_existing={}", outcome.entries_existing));
    report.detail(format!("sources_deleted={}", outcome.sources_deleted));
    report.detail(format!("archives_pruned={}", outcome.archives_pruned));
    for planned in &outcome.planned {
        report.detail(planned);
    }

    for missing in &outcome.roots_missing {
        report.issue(format!("root not found, skipped: {missing}"));
    }
    if outcome.sources_unreadable > 0 {
        report.issue(format!(
            "{} source file(s) unreadable, left for next run",
            outcome.sources_unreadable
        ));
    }
    if outcome.archive_failures > 0 {
        report.issue(format!(
            "{} archive open/append failure(s), sources left in place",
            outcome.archive_failures
        ));
    }
    if outcome.verify_mismatches > 0 {
        report.issue(format!(
            "{} verification mismatch(es), sources kept",
            outcome.verify_mismatches
        ));
    }
    if outcome.prune_failures > 0 {
        report.issue(format!("{} archive(s) could not be pruned", outcome.prune_failures));
    }

    Ok(report)
}
