use crate::error::RotateError;
use crate::rotate::select::LogFile;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendStatus {
    /// A new entry was written and the archive flushed.
    Written,
    /// An entry with this name already exists; nothing was touched.
    AlreadyPresent,
}

/// Capture the full source content. The bytes are held by the caller for
/// the verification step so the comparison baseline is exactly what was
/// written.
pub fn read_source(file: &LogFile) -> Result<Vec<u8>, RotateError> {
    fs::read(&file.path).map_err(|source| RotateError::SourceUnreadable {
        path: file.path.clone(),
        source,
    })
}

/// List the entry names of an existing archive.
pub fn entry_names(archive_path: &Path) -> Result<BTreeSet<String>, RotateError> {
    let handle = File::open(archive_path)?;
    let archive = ZipArchive::new(handle)?;
    Ok(archive.file_names().map(str::to_string).collect())
}

/// Append `contents` as a deflated entry named for the file's basename,
/// carrying the source's last-modified timestamp. The archive is created if
/// absent and opened without truncation otherwise; existing entries are
/// never rewritten. The writer is finished before returning, so the entry
/// is on disk when verification reopens the archive.
pub fn append_entry(
    archive_path: &Path,
    file: &LogFile,
    contents: &[u8],
) -> Result<AppendStatus, RotateError> {
    if archive_path.exists() {
        if entry_names(archive_path)?.contains(&file.name) {
            return Ok(AppendStatus::AlreadyPresent);
        }
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .open(archive_path)
            .map_err(|source| RotateError::ArchiveUnwritable {
                path: archive_path.to_path_buf(),
                source,
            })?;
        let writer = ZipWriter::new_append(handle)?;
        write_entry(writer, file, contents)?;
    } else {
        let handle =
            File::create(archive_path).map_err(|source| RotateError::ArchiveUnwritable {
                path: archive_path.to_path_buf(),
                source,
            })?;
        let writer = ZipWriter::new(handle);
        write_entry(writer, file, contents)?;
    }

    Ok(AppendStatus::Written)
}

fn write_entry(
    mut writer: ZipWriter<File>,
    file: &LogFile,
    contents: &[u8],
) -> Result<(), RotateError> {
    let mut options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    if let Some(stamp) = zip_timestamp(file.modified) {
        options = options.last_modified_time(stamp);
    }
    writer.start_file(file.name.as_str(), options)?;
    writer.write_all(contents)?;
    writer.finish()?;
    Ok(())
}

/// Convert a source mtime to the zip entry timestamp. The format only
/// carries 1980..=2107; outside that range the writer default stands.
fn zip_timestamp(modified: DateTime<Utc>) -> Option<zip::DateTime> {
    let year = u16::try_from(modified.year()).ok()?;
    zip::DateTime::from_date_and_time(
        year,
        modified.month() as u8,
        modified.day() as u8,
        modified.hour() as u8,
        modified.minute() as u8,
        modified.second() as u8,
    )
    .ok()
}
