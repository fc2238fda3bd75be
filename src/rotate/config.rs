use anyhow::{Result, anyhow};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateSettings {
    /// Glob matched against basenames; selects rotation candidates.
    pub include: String,
    /// Glob matched against basenames; empty means no exclusion.
    pub exclude: String,
    /// Files older than this many days are eligible for archiving.
    pub compress_after_days: u32,
    /// Archives older than this many months are pruned; 0 retains forever.
    pub retain_months: u32,
}

impl Default for RotateSettings {
    fn default() -> Self {
        Self {
            include: "*.log".to_string(),
            exclude: String::new(),
            compress_after_days: 5,
            retain_months: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReapConfig {
    pub rotate: RotateSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct PartialReapConfig {
    rotate: Option<RotateSettings>,
}

impl ReapConfig {
    pub fn include_pattern(&self) -> Result<Pattern> {
        Pattern::new(&self.rotate.include)
            .map_err(|err| anyhow!("invalid include glob {:?}: {err}", self.rotate.include))
    }

    pub fn exclude_pattern(&self) -> Result<Option<Pattern>> {
        let raw = self.rotate.exclude.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        Pattern::new(raw)
            .map(Some)
            .map_err(|err| anyhow!("invalid exclude glob {raw:?}: {err}"))
    }

    pub fn retain_months(&self) -> Option<u32> {
        (self.rotate.retain_months > 0).then_some(self.rotate.retain_months)
    }
}

fn env_or_u32(var: &str, fallback: u32) -> u32 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u32>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn validate(cfg: &ReapConfig) -> Result<()> {
    if cfg.rotate.compress_after_days == 0 {
        return Err(anyhow!("invalid compress_after_days: must be >= 1"));
    }
    if cfg.rotate.include.trim().is_empty() {
        return Err(anyhow!("invalid include glob: cannot be empty"));
    }
    cfg.include_pattern()?;
    cfg.exclude_pattern()?;
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("LOGREAP_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    if let Ok(dir) = env::var("LOGREAP_CONFIG_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("config.toml"));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".logreap").join("config.toml"))
}

fn merge_file_config(base: &mut ReapConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let parsed: PartialReapConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse config {}: {err}", path.display()))?;
    if let Some(rotate) = parsed.rotate {
        base.rotate = rotate;
    }
    Ok(())
}

/// Effective configuration: built-in defaults, overlaid by the optional
/// TOML file, overlaid by environment variables. CLI flags are applied on
/// top by the command layer.
pub fn load_config() -> Result<ReapConfig> {
    let mut cfg = ReapConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.rotate.include = env_or_string("LOGREAP_INCLUDE", &cfg.rotate.include);
    cfg.rotate.exclude = env_or_string("LOGREAP_EXCLUDE", &cfg.rotate.exclude);
    cfg.rotate.compress_after_days =
        env_or_u32("LOGREAP_COMPRESS_AFTER_DAYS", cfg.rotate.compress_after_days);
    cfg.rotate.retain_months = env_or_u32("LOGREAP_RETAIN_MONTHS", cfg.rotate.retain_months);

    validate(&cfg)?;
    Ok(cfg)
}
