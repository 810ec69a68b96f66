// logclean - app/schedule.rs
//
// Recurring log pruning via the user's crontab. Installed entries carry a
// unique comment tag so they can be listed and removed later without
// touching unrelated crontab lines.
//
// Unix only; other platforms get `ScheduleError::Unsupported`.

use crate::util::error::ScheduleError;
use std::path::Path;

/// Tag prefix appended as a trailing comment to every installed entry.
pub const TAG_PREFIX: &str = crate::util::constants::CRON_COMMENT_BASE;

/// Install a daily clean-logs job for `log_dir` at `hour:minute`.
///
/// Returns the installed crontab line. Existing entries, including earlier
/// logclean ones, are preserved.
#[cfg(unix)]
pub fn install(log_dir: &Path, hour: u8, minute: u8) -> Result<String, ScheduleError> {
    use chrono::Utc;

    if hour > 23 || minute > 59 {
        return Err(ScheduleError::InvalidTime { hour, minute });
    }

    let exe = std::env::current_exe()
        .map_err(|source| ScheduleError::CrontabUnavailable { source })?;
    let tag = format!("{TAG_PREFIX}_{}", Utc::now().format("%Y%m%dT%H%M%S"));
    let entry = cron_entry(&exe, log_dir, hour, minute, &tag);

    let mut table = read_crontab()?;
    if !table.is_empty() && !table.ends_with('\n') {
        table.push('\n');
    }
    table.push_str(&entry);
    table.push('\n');
    write_crontab(&table)?;

    tracing::info!(entry = %entry, "Scheduled daily log pruning");
    Ok(entry)
}

/// Remove every crontab entry previously installed by logclean.
///
/// Returns the number of entries removed.
#[cfg(unix)]
pub fn remove_all() -> Result<usize, ScheduleError> {
    let table = read_crontab()?;
    let kept: Vec<&str> = table
        .lines()
        .filter(|line| !is_tagged(line))
        .collect();
    let removed = table.lines().count() - kept.len();

    if removed > 0 {
        let mut new_table = kept.join("\n");
        if !new_table.is_empty() {
            new_table.push('\n');
        }
        write_crontab(&new_table)?;
    }

    tracing::info!(removed, "Removed scheduled entries");
    Ok(removed)
}

/// True when `line` is one of ours.
fn is_tagged(line: &str) -> bool {
    line.contains(&format!("# {TAG_PREFIX}"))
}

/// Single-quote `path` for the crontab command field. Embedded single
/// quotes are closed, escaped, and reopened so the shell sees the literal
/// character instead of a terminated string.
fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', r"'\''"))
}

fn cron_entry(exe: &Path, log_dir: &Path, hour: u8, minute: u8, tag: &str) -> String {
    format!(
        "{minute} {hour} * * * {} clean-logs {} --days {} # {tag}",
        shell_quote(exe),
        shell_quote(log_dir),
        crate::util::constants::DEFAULT_RETENTION_DAYS,
    )
}

/// Current crontab content; a missing crontab reads as empty ("no crontab
/// for user" exits non-zero).
#[cfg(unix)]
fn read_crontab() -> Result<String, ScheduleError> {
    let output = std::process::Command::new("crontab")
        .arg("-l")
        .output()
        .map_err(|source| ScheduleError::CrontabUnavailable { source })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Ok(String::new())
    }
}

#[cfg(unix)]
fn write_crontab(table: &str) -> Result<(), ScheduleError> {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = std::process::Command::new("crontab")
        .arg("-")
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ScheduleError::CrontabUnavailable { source })?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(table.as_bytes())
            .map_err(|source| ScheduleError::CrontabUnavailable { source })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|source| ScheduleError::CrontabUnavailable { source })?;
    if !output.status.success() {
        return Err(ScheduleError::CrontabWrite {
            detail: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn install(_log_dir: &Path, _hour: u8, _minute: u8) -> Result<String, ScheduleError> {
    Err(ScheduleError::Unsupported)
}

#[cfg(not(unix))]
pub fn remove_all() -> Result<usize, ScheduleError> {
    Err(ScheduleError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_line_detection() {
        let line = format!("0 3 * * * /usr/bin/logclean clean-logs /var/log # {TAG_PREFIX}_20240101T000000");
        assert!(is_tagged(&line));
        assert!(!is_tagged("0 3 * * * /usr/bin/backup.sh"));
        assert!(!is_tagged(""));
    }

    #[test]
    fn test_cron_entry_escapes_single_quotes() {
        let entry = cron_entry(
            Path::new("/usr/local/bin/logclean"),
            Path::new("/var/log/it's here"),
            3,
            30,
            "logclean-automated_20240101T000000",
        );
        assert!(entry.starts_with("30 3 * * * '/usr/local/bin/logclean' clean-logs "));
        assert!(entry.contains(r"'/var/log/it'\''s here'"));
        assert!(entry.ends_with("# logclean-automated_20240101T000000"));
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_time_rejected() {
        let err = install(Path::new("/var/log"), 24, 0).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTime { hour: 24, minute: 0 }));
        let err = install(Path::new("/var/log"), 0, 60).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidTime { .. }));
    }
}
