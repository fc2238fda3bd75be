use crate::commands::CommandReport;
use crate::rotate::config::{load_config, resolve_config_path};
use crate::rotate::naming;
use anyhow::Result;

pub fn run() -> Result<CommandReport> {
    let cfg = load_config()?;
    let host = naming::host_label()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("host={host}"));
    match resolve_config_path() {
        Some(path) => {
            report.detail(format!("config_path={}", path.display()));
            if !path.exists() {
                report.detail("config_file=absent (defaults + environment in effect)");
            }
        }
        None => report.detail("config_path=unresolved (no home directory)"),
    }
    report.detail(format!("include={}", cfg.rotate.include));
    let exclude = if cfg.rotate.exclude.trim().is_empty() {
        "(none)"
    } else {
        cfg.rotate.exclude.as_str()
    };
    report.detail(format!("exclude={exclude}"));
    report.detail(format!(
        "compress_after_days={}",
        cfg.rotate.compress_after_days
    ));
    match cfg.retain_months() {
        Some(months) => report.detail(format!("retain_months={months}")),
        None => report.detail("retain_months=forever"),
    }

    Ok(report)
}
