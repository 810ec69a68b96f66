// logclean - app/run.rs
//
// Orchestration of clean runs: discovery, pure rewriting, backup, write.
//
// Pipeline order is fixed: all rewrites are computed before anything is
// written, the files that will change are backed up in one snapshot, and
// only files whose backup succeeded are rewritten. Per-file problems become
// outcomes in the summary; they never abort the batch.

use crate::app::backup;
use crate::app::discovery::{self, DiscoveryConfig, TargetKind};
use crate::core::model::{CleanSummary, FileStatus, Language, MatchedStatement};
use crate::core::retention::{self, RetentionCutoff};
use crate::core::rewriter;
use crate::core::segment;
use crate::util::constants;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for a clean-code run.
#[derive(Debug, Clone)]
pub struct CleanCodeOptions {
    /// Files and/or directories to clean.
    pub targets: Vec<PathBuf>,

    /// Restrict cleaning to these extensions (without dots); `None` means
    /// every supported extension.
    pub types: Option<Vec<String>>,

    /// Snapshot files before rewriting them.
    pub backup: bool,

    /// Report what would change without writing anything.
    pub dry_run: bool,
}

/// Options for a clean-logs run.
#[derive(Debug, Clone)]
pub struct CleanLogsOptions {
    /// Log file or directory of log files.
    pub target: PathBuf,
    pub cutoff: RetentionCutoff,
    pub backup: bool,
    pub dry_run: bool,
}

/// A computed rewrite waiting for backup and write.
struct PendingWrite {
    path: PathBuf,
    content: String,
    lines_removed: usize,
    removed: Vec<MatchedStatement>,
}

/// The directory that anchors snapshot-relative paths and hosts the assets
/// area: the first directory target, or the first target's parent.
fn assets_root(first_target: &Path) -> PathBuf {
    if first_target.is_dir() {
        first_target.to_path_buf()
    } else {
        first_target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn log_warnings(warnings: &[String]) {
    for w in warnings {
        warn!("{w}");
    }
}

// =============================================================================
// clean-code
// =============================================================================

/// Remove logging/console statements from source files.
pub fn clean_code(
    options: &CleanCodeOptions,
    config: &DiscoveryConfig,
) -> crate::util::error::Result<CleanSummary> {
    let (mut files, warnings) = discovery::resolve_source_targets(&options.targets, config)?;
    log_warnings(&warnings);

    if let Some(types) = &options.types {
        files.retain(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| types.iter().any(|t| t.eq_ignore_ascii_case(e)))
                .unwrap_or(false)
        });
    }

    info!(files = files.len(), dry_run = options.dry_run, "Cleaning code");

    let mut summary = CleanSummary::default();
    let mut pending: Vec<PendingWrite> = Vec::new();

    for path in files {
        let language = match Language::from_path(&path) {
            Some(l) => l,
            None => continue,
        };

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read file, skipping");
                summary.record(path, FileStatus::Unreadable { reason: e.to_string() });
                continue;
            }
        };

        let (lines, had_final_newline) = rewriter::split_lines(&content);
        let result = rewriter::rewrite(&lines, language);

        if result.is_unchanged() {
            summary.record(path, FileStatus::Unchanged);
            continue;
        }

        debug!(
            path = %path.display(),
            language = language.label(),
            statements = result.removed.len(),
            lines = result.lines_removed(),
            "Statements matched"
        );

        pending.push(PendingWrite {
            path,
            lines_removed: result.lines_removed(),
            content: rewriter::join_lines(&result.lines, had_final_newline),
            removed: result.removed,
        });
    }

    write_pending(
        pending,
        &mut summary,
        options.targets.first().map(|t| assets_root(t)),
        options.backup,
        options.dry_run,
        true,
    )?;

    Ok(summary)
}

// =============================================================================
// clean-logs
// =============================================================================

/// Drop log entries older than the cutoff from log files.
pub fn clean_logs(
    options: &CleanLogsOptions,
    config: &DiscoveryConfig,
) -> crate::util::error::Result<CleanSummary> {
    let files = if options.target.is_file() {
        vec![options.target.clone()]
    } else {
        let (files, warnings) = discovery::discover_files(&options.target, TargetKind::Logs, config)?;
        log_warnings(&warnings);
        files
    };

    info!(
        files = files.len(),
        cutoff = %options.cutoff.at(),
        dry_run = options.dry_run,
        "Pruning log entries"
    );

    let mut summary = CleanSummary::default();
    let mut pending: Vec<PendingWrite> = Vec::new();

    for path in files {
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read file, skipping");
                summary.record(path, FileStatus::Unreadable { reason: e.to_string() });
                continue;
            }
        };

        let entries = segment::segment(&content);
        let before = entries.len();
        let kept = retention::filter_entries(entries, &options.cutoff);

        if kept.len() == before {
            summary.record(path, FileStatus::Unchanged);
            continue;
        }

        let new_content = segment::rejoin(&kept);
        let lines_removed = content.lines().count() - new_content.lines().count();
        debug!(
            path = %path.display(),
            entries_dropped = before - kept.len(),
            lines = lines_removed,
            "Aged entries matched"
        );

        pending.push(PendingWrite {
            path,
            content: new_content,
            lines_removed,
            removed: Vec::new(),
        });
    }

    write_pending(
        pending,
        &mut summary,
        Some(assets_root(&options.target)),
        options.backup,
        options.dry_run,
        false,
    )?;

    Ok(summary)
}

// =============================================================================
// Shared write phase
// =============================================================================

/// Back up and write the computed rewrites.
///
/// `count_kinds` controls whether per-kind statement statistics are folded
/// into the summary (clean-code only).
fn write_pending(
    pending: Vec<PendingWrite>,
    summary: &mut CleanSummary,
    root: Option<PathBuf>,
    take_backup: bool,
    dry_run: bool,
    count_kinds: bool,
) -> crate::util::error::Result<()> {
    if dry_run {
        for item in pending {
            if count_kinds {
                summary.count_statements(&item.removed);
            }
            summary.record(
                item.path,
                FileStatus::WouldClean {
                    lines_removed: item.lines_removed,
                },
            );
        }
        return Ok(());
    }

    let snapshot = if take_backup && !pending.is_empty() {
        let root = root.unwrap_or_else(|| PathBuf::from("."));
        let assets_dir = root.join(constants::ASSETS_DIR_NAME);
        let targets: Vec<PathBuf> = pending.iter().map(|p| p.path.clone()).collect();
        // Targets from outside the anchor root (several CLI targets) are
        // mirrored relative to their common ancestor instead, so same-named
        // files keep distinct snapshot paths.
        let mirror_root = match backup::common_ancestor(&targets) {
            Some(dir) if !dir.starts_with(&root) => dir,
            _ => root.clone(),
        };
        let snap = backup::snapshot(&mirror_root, &targets, &assets_dir)?;
        summary.snapshot_dir = Some(snap.dir.clone());
        Some(snap)
    } else {
        None
    };

    for item in pending {
        // A file whose backup failed must not be rewritten.
        if let Some(snap) = &snapshot {
            if !snap.covers(&item.path) {
                let reason = snap
                    .failures
                    .iter()
                    .find(|f| f.original == item.path)
                    .map(|f| f.reason.clone())
                    .unwrap_or_else(|| "not present in snapshot".to_string());
                warn!(path = %item.path.display(), reason, "Backup failed, rewrite refused");
                summary.record(item.path, FileStatus::BackupFailed { reason });
                continue;
            }
        }

        match fs::write(&item.path, &item.content) {
            Ok(()) => {
                if count_kinds {
                    summary.count_statements(&item.removed);
                }
                info!(path = %item.path.display(), lines = item.lines_removed, "Cleaned");
                summary.record(
                    item.path,
                    FileStatus::Cleaned {
                        lines_removed: item.lines_removed,
                    },
                );
            }
            Err(e) => {
                warn!(path = %item.path.display(), error = %e, "Write failed");
                summary.record(item.path, FileStatus::WriteFailed { reason: e.to_string() });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn opts(dir: &TempDir) -> CleanCodeOptions {
        CleanCodeOptions {
            targets: vec![dir.path().to_path_buf()],
            types: None,
            backup: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_clean_code_rewrites_and_counts() {
        let dir = TempDir::new().unwrap();
        let py = dir.path().join("app.py");
        fs::write(&py, "import logging\nlogger.info('x')\nprint('kept')\n").unwrap();

        let summary = clean_code(&opts(&dir), &DiscoveryConfig::default()).unwrap();

        assert_eq!(summary.files_cleaned, 1);
        assert_eq!(summary.lines_removed, 2);
        assert_eq!(fs::read_to_string(&py).unwrap(), "print('kept')\n");
        assert_eq!(summary.removed_by_kind.get("logging_import"), Some(&1));
        assert_eq!(summary.removed_by_kind.get("logger.info"), Some(&1));
        assert!(!summary.has_failures());
    }

    #[test]
    fn test_clean_code_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let js = dir.path().join("app.js");
        let original = "console.log('x');\nwork();\n";
        fs::write(&js, original).unwrap();

        let mut options = opts(&dir);
        options.dry_run = true;
        let summary = clean_code(&options, &DiscoveryConfig::default()).unwrap();

        assert_eq!(fs::read_to_string(&js).unwrap(), original);
        assert_eq!(summary.lines_removed, 1);
        assert!(matches!(
            summary.outcomes[0].status,
            FileStatus::WouldClean { lines_removed: 1 }
        ));
    }

    #[test]
    fn test_clean_code_backup_taken_before_write() {
        let dir = TempDir::new().unwrap();
        let py = dir.path().join("app.py");
        fs::write(&py, "logger.debug('x')\nkeep = 1\n").unwrap();

        let mut options = opts(&dir);
        options.backup = true;
        let summary = clean_code(&options, &DiscoveryConfig::default()).unwrap();

        let snap_dir = summary.snapshot_dir.clone().unwrap();
        assert_eq!(
            fs::read_to_string(snap_dir.join("app.py")).unwrap(),
            "logger.debug('x')\nkeep = 1\n"
        );
        assert_eq!(fs::read_to_string(&py).unwrap(), "keep = 1\n");
    }

    #[test]
    fn test_clean_code_types_filter() {
        let dir = TempDir::new().unwrap();
        let py = dir.path().join("a.py");
        let js = dir.path().join("b.js");
        fs::write(&py, "logger.info('x')\n").unwrap();
        fs::write(&js, "console.log('x');\n").unwrap();

        let mut options = opts(&dir);
        options.types = Some(vec!["py".to_string()]);
        let summary = clean_code(&options, &DiscoveryConfig::default()).unwrap();

        assert_eq!(summary.files_scanned, 1);
        assert_eq!(fs::read_to_string(&py).unwrap(), "");
        assert_eq!(fs::read_to_string(&js).unwrap(), "console.log('x');\n");
    }

    #[test]
    fn test_clean_logs_prunes_old_entries() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");
        let content = "\
2020-01-01 00:00:00 ancient\n  with continuation\n2030-01-01 00:00:00 future\n";
        fs::write(&log, content).unwrap();

        let options = CleanLogsOptions {
            target: log.clone(),
            cutoff: RetentionCutoff::instant(Utc::now()),
            backup: false,
            dry_run: false,
        };
        let summary = clean_logs(&options, &DiscoveryConfig::default()).unwrap();

        assert_eq!(summary.files_cleaned, 1);
        assert_eq!(
            fs::read_to_string(&log).unwrap(),
            "2030-01-01 00:00:00 future\n"
        );
    }

    #[test]
    fn test_clean_logs_unchanged_when_all_recent() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "2030-01-01 00:00:00 future\n").unwrap();

        let options = CleanLogsOptions {
            target: log.clone(),
            cutoff: RetentionCutoff::instant(Utc::now() - Duration::days(30)),
            backup: true,
            dry_run: false,
        };
        let summary = clean_logs(&options, &DiscoveryConfig::default()).unwrap();

        assert_eq!(summary.files_cleaned, 0);
        assert!(summary.snapshot_dir.is_none(), "no backup for no changes");
        assert!(matches!(summary.outcomes[0].status, FileStatus::Unchanged));
    }

    #[test]
    fn test_unreadable_file_recorded_not_fatal() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.py");
        fs::write(&good, "logger.info('x')\n").unwrap();
        // Invalid UTF-8 makes read_to_string fail.
        fs::write(dir.path().join("bad.py"), [0xff, 0xfe, 0x00]).unwrap();

        let summary = clean_code(&opts(&dir), &DiscoveryConfig::default()).unwrap();

        assert!(summary.has_failures());
        assert_eq!(summary.failure_count(), 1);
        assert_eq!(summary.files_cleaned, 1);
        assert_eq!(fs::read_to_string(&good).unwrap(), "");
    }
}
