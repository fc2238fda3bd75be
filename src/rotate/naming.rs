use crate::rotate::bucket::MonthKey;
use anyhow::{Result, anyhow};
use std::env;
use std::path::Path;

pub const ARCHIVE_EXT: &str = "zip";

fn sanitize_label(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

/// Resolve the host identifier baked into archive names. `LOGREAP_HOST`
/// overrides the detected hostname; both go through the same sanitizer so
/// the name stays glob- and shell-safe.
pub fn host_label() -> Result<String> {
    if let Ok(custom) = env::var("LOGREAP_HOST") {
        let slug = sanitize_label(custom.trim());
        if !slug.is_empty() {
            return Ok(slug);
        }
    }

    let raw = hostname::get()
        .map_err(|err| anyhow!("failed to resolve hostname: {err}"))?
        .to_string_lossy()
        .to_string();
    let slug = sanitize_label(&raw);
    if slug.is_empty() {
        return Err(anyhow!("hostname {raw:?} sanitized to an empty label"));
    }
    Ok(slug)
}

/// Label a root contributes to its archive names: its sanitized basename.
pub fn folder_label(root: &Path) -> String {
    let base = root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "root".to_string());
    let slug = sanitize_label(&base);
    if slug.is_empty() { "root".to_string() } else { slug }
}

pub fn archive_file_name(host: &str, label: &str, key: MonthKey) -> String {
    format!("{host}-{label}-{key}.{ARCHIVE_EXT}")
}

/// True when `name` is one of this root's archives, i.e. matches
/// `<host>-<label>-YYYY-MM.zip`.
pub fn is_archive_name(name: &str, host: &str, label: &str) -> bool {
    let prefix = format!("{host}-{label}-");
    let Some(rest) = name.strip_prefix(&prefix) else {
        return false;
    };
    let Some(stamp) = rest.strip_suffix(&format!(".{ARCHIVE_EXT}")) else {
        return false;
    };
    let bytes = stamp.as_bytes();
    bytes.len() == 7
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..].iter().all(u8::is_ascii_digit)
}
