use crate::commands::CommandReport;
use crate::rotate::config::load_config;
use crate::rotate::naming;
use crate::rotate::run::prune_run;
use crate::rotate::window::RunWindow;
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Root directories whose archives are pruned.
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,
    /// Prune archives older than this many months.
    #[arg(long)]
    pub retain_months: Option<u32>,
    /// Describe deletions instead of performing them.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: &PruneArgs) -> Result<CommandReport> {
    let mut cfg = load_config()?;
    if let Some(months) = args.retain_months {
        cfg.rotate.retain_months = months;
    }
    let Some(retain_months) = cfg.retain_months() else {
        anyhow::bail!("retention not configured: pass --retain-months or set retain_months");
    };

    let host = naming::host_label()?;
    let window = RunWindow::at(Utc::now(), cfg.rotate.compress_after_days, Some(retain_months));
    let outcome = prune_run(&args.roots, &host, window, args.dry_run);

    let mut report = CommandReport::new(if args.dry_run { "prune (dry-run)" } else { "prune" });
    report.detail(format!("host={host}"));
    if let Some(retain_before) = window.retain_before {
        report.detail(format!("retain_before={}", retain_before.to_rfc3339()));
    }
    report.detail(format!("roots_processed={}", outcome.roots_processed));
    report.detail(format!("archives_pruned={}", outcome.archives_pruned));
    for planned in &outcome.planned {
        report.detail(planned);
    }

    for missing in &outcome.roots_missing {
        report.issue(format!("root not found, skipped: {missing}"));
    }
    if outcome.prune_failures > 0 {
        report.issue(format!("{} archive(s) could not be pruned", outcome.prune_failures));
    }

    Ok(report)
}
