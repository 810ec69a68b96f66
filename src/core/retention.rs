// logclean - core/retention.rs
//
// Age-based filtering of segmented log entries. An entry is dropped exactly
// when its parsed timestamp is strictly before the cutoff; entries without
// a timestamp are always kept.

use crate::core::model::LogEntry;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// The point in time before which log entries are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionCutoff(DateTime<Utc>);

impl RetentionCutoff {
    /// Cutoff at `days` before now: entries older than `days` days go.
    pub fn days(days: u32) -> Self {
        Self(Utc::now() - Duration::days(i64::from(days)))
    }

    /// Cutoff at midnight UTC of an explicit calendar date: everything
    /// logged before that date goes.
    pub fn date(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
    }

    /// Cutoff at an exact instant (used by tests for determinism).
    pub fn instant(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// The cutoff instant.
    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }

    /// True when an entry with this timestamp should be dropped.
    pub fn drops(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp < self.0
    }
}

/// Keep entries at or after the cutoff, plus every timestamp-less entry.
/// Order and ordinals of the survivors are untouched.
pub fn filter_entries(entries: Vec<LogEntry>, cutoff: &RetentionCutoff) -> Vec<LogEntry> {
    entries
        .into_iter()
        .filter(|entry| match entry.timestamp {
            Some(ts) => !cutoff.drops(ts),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(ordinal: usize, timestamp: Option<DateTime<Utc>>) -> LogEntry {
        LogEntry {
            ordinal,
            timestamp,
            raw: format!("entry {ordinal}\n"),
        }
    }

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_strictly_before_cutoff_dropped() {
        let cutoff = RetentionCutoff::instant(utc(2024, 6, 1));
        assert!(cutoff.drops(utc(2024, 5, 31)));
        assert!(!cutoff.drops(utc(2024, 6, 1)));
        assert!(!cutoff.drops(utc(2024, 6, 2)));
    }

    #[test]
    fn test_entry_at_exact_cutoff_kept() {
        let at = utc(2024, 6, 1);
        let cutoff = RetentionCutoff::instant(at);
        let kept = filter_entries(vec![entry(0, Some(at))], &cutoff);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_untimestamped_entries_always_kept() {
        let cutoff = RetentionCutoff::instant(utc(2024, 6, 1));
        let entries = vec![
            entry(0, None),
            entry(1, Some(utc(2020, 1, 1))),
            entry(2, None),
        ];
        let kept = filter_entries(entries, &cutoff);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|e| e.timestamp.is_none()));
    }

    #[test]
    fn test_order_and_ordinals_preserved() {
        let cutoff = RetentionCutoff::instant(utc(2024, 6, 1));
        let entries = vec![
            entry(0, Some(utc(2020, 1, 1))),
            entry(1, Some(utc(2024, 7, 1))),
            entry(2, Some(utc(2024, 8, 1))),
        ];
        let kept = filter_entries(entries, &cutoff);
        let ordinals: Vec<usize> = kept.iter().map(|e| e.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }

    #[test]
    fn test_date_cutoff_is_midnight_utc() {
        let cutoff = RetentionCutoff::date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(
            cutoff.at(),
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        );
        // 23:59 the previous day is strictly before midnight.
        assert!(cutoff.drops(Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 0).unwrap()));
    }

    #[test]
    fn test_days_cutoff_is_relative_to_now() {
        let cutoff = RetentionCutoff::days(30);
        assert!(cutoff.drops(Utc::now() - Duration::days(31)));
        assert!(!cutoff.drops(Utc::now() - Duration::days(29)));
    }
}
