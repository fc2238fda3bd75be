use crate::rotate::select::LogFile;
use chrono::Datelike;
use std::collections::BTreeMap;
use std::fmt;

/// Year-month bucket identifier, displayed as `YYYY-MM`. Archives are keyed
/// by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(file: &LogFile) -> Self {
        Self {
            year: file.modified.year(),
            month: file.modified.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone)]
pub struct MonthGroup {
    pub key: MonthKey,
    pub files: Vec<LogFile>,
}

/// Group files by the year-month of their last-modified timestamp.
///
/// Groups come back in ascending month order and files within a group in
/// ascending basename order. The ordering carries no correctness weight
/// (archives are keyed by month); it keeps runs and test output
/// deterministic.
pub fn bucket_by_month(files: Vec<LogFile>) -> Vec<MonthGroup> {
    let mut buckets: BTreeMap<MonthKey, Vec<LogFile>> = BTreeMap::new();
    for file in files {
        buckets.entry(MonthKey::of(&file)).or_default().push(file);
    }

    buckets
        .into_iter()
        .map(|(key, mut files)| {
            files.sort_by(|a, b| a.name.cmp(&b.name));
            MonthGroup { key, files }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{MonthKey, bucket_by_month};
    use crate::rotate::select::LogFile;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn log_file(name: &str, year: i32, month: u32, day: u32) -> LogFile {
        LogFile {
            path: PathBuf::from(format!("/logs/{name}")),
            name: name.to_string(),
            modified: Utc.with_ymd_and_hms(year, month, day, 8, 30, 0).unwrap(),
            len: 1,
        }
    }

    #[test]
    fn month_key_displays_zero_padded() {
        let file = log_file("a.log", 2024, 3, 2);
        assert_eq!(MonthKey::of(&file).to_string(), "2024-03");
    }

    #[test]
    fn groups_come_back_in_ascending_month_order() {
        let files = vec![
            log_file("late.log", 2024, 4, 1),
            log_file("early.log", 2023, 12, 31),
            log_file("mid.log", 2024, 1, 15),
        ];

        let groups = bucket_by_month(files);
        let keys: Vec<String> = groups.iter().map(|g| g.key.to_string()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-01", "2024-04"]);
    }

    #[test]
    fn files_within_a_group_sort_by_basename() {
        let files = vec![
            log_file("b.log", 2024, 3, 5),
            log_file("a.log", 2024, 3, 9),
            log_file("c.log", 2024, 3, 1),
        ];

        let groups = bucket_by_month(files);
        assert_eq!(groups.len(), 1);
        let names: Vec<&str> = groups[0].files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.log", "b.log", "c.log"]);
    }
}
