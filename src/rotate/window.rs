use chrono::{DateTime, Duration, Months, Utc};

/// The aging boundaries for one run, derived once from a single `now`
/// snapshot and held constant for the whole run.
///
/// This is the single place cutoffs are computed — components never read
/// the system clock themselves.
#[derive(Debug, Clone, Copy)]
pub struct RunWindow {
    pub now: DateTime<Utc>,
    /// Files modified strictly before this point are eligible for archiving.
    pub compress_before: DateTime<Utc>,
    /// Archives modified strictly before this point are eligible for
    /// pruning; `None` means archives are retained forever.
    pub retain_before: Option<DateTime<Utc>>,
}

impl RunWindow {
    pub fn at(now: DateTime<Utc>, compress_after_days: u32, retain_months: Option<u32>) -> Self {
        let compress_before = now - Duration::days(i64::from(compress_after_days));
        let retain_before = retain_months
            .filter(|months| *months > 0)
            .and_then(|months| now.checked_sub_months(Months::new(months)));
        Self {
            now,
            compress_before,
            retain_before,
        }
    }
}
