// logclean - core/segment.rs
//
// Log file segmentation: split raw content into entries, where an entry is
// a timestamp-bearing start line plus any continuation lines under it.
//
// Entry-start formats are tried in a fixed priority order. A line matching
// no format is a continuation of the entry above it; leading continuations
// (file starts mid-entry) are collected into a timestamp-less entry that the
// retention filter always keeps.
//
// Segmentation never fails: a start line whose matched text does not parse
// to a real timestamp still starts an entry, just with `timestamp: None`.

use crate::core::model::LogEntry;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// One recognised entry-start format: a detection pattern anchored at the
/// line start plus a parser for the captured timestamp text.
struct EntryFormat {
    name: &'static str,
    pattern: Regex,
    parse: fn(&str) -> Option<DateTime<Utc>>,
}

/// Formats in priority order; the first whose pattern matches wins.
fn entry_formats() -> &'static Vec<EntryFormat> {
    static FORMATS: OnceLock<Vec<EntryFormat>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        vec![
            EntryFormat {
                name: "iso",
                pattern: Regex::new(
                    r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:[.,]\d{1,9})?)",
                )
                .expect("iso pattern: invalid regex"),
                parse: parse_iso,
            },
            EntryFormat {
                name: "epoch",
                // 13 digits (milliseconds) before 10 (seconds): a 13-digit
                // value also has a 10-digit prefix.
                pattern: Regex::new(r"^(\d{13}|\d{10})\s").expect("epoch pattern: invalid regex"),
                parse: parse_epoch,
            },
            EntryFormat {
                name: "bracketed",
                pattern: Regex::new(r"^\[([A-Z][a-z]{2} \d{2} \d{2}:\d{2}:\d{2} \d{4})\]")
                    .expect("bracketed pattern: invalid regex"),
                parse: parse_bracketed,
            },
        ]
    })
}

// =============================================================================
// Timestamp parsers
// =============================================================================

/// `YYYY-MM-DD HH:MM:SS` with optional fractional seconds after `.` or `,`.
fn parse_iso(text: &str) -> Option<DateTime<Utc>> {
    let normalised = text.replace(',', ".");
    let parsed = NaiveDateTime::parse_from_str(&normalised, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalised, "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    Some(parsed.and_utc())
}

/// Unix epoch: 10 digits are seconds, 13 digits are milliseconds (truncated
/// to whole seconds).
fn parse_epoch(text: &str) -> Option<DateTime<Utc>> {
    let value: i64 = text.parse().ok()?;
    let seconds = if text.len() == 13 { value / 1000 } else { value };
    DateTime::from_timestamp(seconds, 0)
}

/// Bracketed syslog-style: `Mon DD HH:MM:SS YYYY` (already stripped of its
/// brackets by the capture group).
fn parse_bracketed(text: &str) -> Option<DateTime<Utc>> {
    let parsed = NaiveDateTime::parse_from_str(text, "%b %d %H:%M:%S %Y").ok()?;
    Some(parsed.and_utc())
}

// =============================================================================
// Segmentation
// =============================================================================

/// True when `line` matches any entry-start format. Used by discovery to
/// sniff whether an unknown file looks like a log file.
pub fn matches_entry_start(line: &str) -> bool {
    entry_formats().iter().any(|f| f.pattern.is_match(line))
}

/// Try each format against a line; on the first pattern hit, return the
/// parse result (which may still be `None` for values like month 13).
fn classify_line(line: &str) -> Option<Option<DateTime<Utc>>> {
    for format in entry_formats() {
        if let Some(caps) = format.pattern.captures(line) {
            let parsed = (format.parse)(&caps[1]);
            if parsed.is_none() {
                tracing::debug!(
                    format = format.name,
                    text = &caps[1],
                    "Entry start matched but timestamp failed to parse"
                );
            }
            return Some(parsed);
        }
    }
    None
}

/// Split log content into entries.
///
/// Iterates lines with their terminators attached so that concatenating the
/// returned entries' `raw` fields in order reproduces `content` exactly,
/// including a missing final newline.
pub fn segment(content: &str) -> Vec<LogEntry> {
    let mut entries: Vec<LogEntry> = Vec::new();

    for line in content.split_inclusive('\n') {
        let stripped = line.trim_end_matches(['\n', '\r']);

        match classify_line(stripped) {
            Some(timestamp) => {
                entries.push(LogEntry {
                    ordinal: entries.len(),
                    timestamp,
                    raw: line.to_string(),
                });
            }
            None => match entries.last_mut() {
                Some(entry) => entry.raw.push_str(line),
                None => {
                    // Content starts mid-entry: open a timestamp-less entry.
                    entries.push(LogEntry {
                        ordinal: 0,
                        timestamp: None,
                        raw: line.to_string(),
                    });
                }
            },
        }
    }

    entries
}

/// Reassemble entries into file content. With the full entry list this is
/// the exact inverse of `segment`.
pub fn rejoin(entries: &[LogEntry]) -> String {
    entries.iter().map(|e| e.raw.as_str()).collect()
}
