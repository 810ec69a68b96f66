// logclean - app/backup.rs
//
// Backup-before-modify safety. Every clean run that will rewrite files first
// copies them into a timestamp-named snapshot directory under the assets
// area, mirroring their paths relative to the scanned root, and records each
// copy in an append-only change log.
//
// A snapshot is best-effort per target: one file that cannot be copied is
// recorded as a failure and the rest are still backed up. Callers must not
// rewrite a file whose backup failed.

use crate::util::constants::{BACKUP_DIR_NAME, CHANGE_LOG_FILE_NAME, SNAPSHOT_TIMESTAMP_FORMAT};
use crate::util::error::{BackupError, RestoreError};
use chrono::Utc;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A file successfully copied into a snapshot.
#[derive(Debug, Clone)]
pub struct CopiedFile {
    /// Path of the file as it was targeted for cleaning.
    pub original: PathBuf,
    /// Where its pre-modification copy lives inside the snapshot.
    pub snapshot: PathBuf,
}

/// A file that could not be copied into a snapshot.
#[derive(Debug, Clone)]
pub struct FailedBackup {
    pub original: PathBuf,
    pub reason: String,
}

/// One completed (possibly partial) backup snapshot.
#[derive(Debug)]
pub struct BackupSnapshot {
    /// The timestamp-named snapshot directory.
    pub dir: PathBuf,
    pub copied: Vec<CopiedFile>,
    pub failures: Vec<FailedBackup>,
}

impl BackupSnapshot {
    /// True when `path` was successfully copied into this snapshot and may
    /// therefore be rewritten.
    pub fn covers(&self, path: &Path) -> bool {
        self.copied.iter().any(|c| c.original == path)
    }
}

/// Longest common directory of the given file paths.
///
/// Callers backing up targets from several roots pass this as the snapshot
/// `root` so same-named files keep distinct snapshot paths. `None` when the
/// list is empty or the paths share no prefix at all.
pub fn common_ancestor(paths: &[PathBuf]) -> Option<PathBuf> {
    let mut prefix = paths.first()?.parent()?.to_path_buf();
    for path in &paths[1..] {
        let dir = path.parent()?;
        while !dir.starts_with(&prefix) {
            prefix = prefix.parent()?.to_path_buf();
        }
    }
    Some(prefix)
}

/// Copy `targets` into a fresh snapshot directory under
/// `<assets_dir>/backup/<timestamp>/`.
///
/// Each target's snapshot path mirrors its location relative to `root`;
/// targets outside `root` fall back to their bare file name. A target whose
/// snapshot path would collide with an earlier one is recorded as a failure,
/// never an overwrite. Per-target copy failures are collected, not fatal.
/// Only an unusable snapshot directory or change log aborts the whole backup.
pub fn snapshot(
    root: &Path,
    targets: &[PathBuf],
    assets_dir: &Path,
) -> Result<BackupSnapshot, BackupError> {
    let stamp = Utc::now().format(SNAPSHOT_TIMESTAMP_FORMAT).to_string();
    let base = assets_dir.join(BACKUP_DIR_NAME);

    // Two runs in the same second must not share a snapshot directory.
    let mut dir = base.join(&stamp);
    let mut suffix = 1;
    while dir.exists() {
        suffix += 1;
        dir = base.join(format!("{stamp}-{suffix}"));
    }

    fs::create_dir_all(&dir).map_err(|source| BackupError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let change_log_path = dir.join(CHANGE_LOG_FILE_NAME);
    let mut change_log = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&change_log_path)
        .map_err(|source| BackupError::ChangeLog {
            path: change_log_path.clone(),
            source,
        })?;

    let mut copied = Vec::new();
    let mut failures = Vec::new();
    let mut used_dests: HashSet<PathBuf> = HashSet::new();

    for target in targets {
        let relative = target
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(target.file_name().unwrap_or(target.as_os_str())));
        let dest = dir.join(&relative);

        // The change-log format reserves " | " as its field delimiter.
        if target.display().to_string().contains(" | ")
            || dest.display().to_string().contains(" | ")
        {
            warn!(path = %target.display(), "Path contains the change-log delimiter, not backed up");
            failures.push(FailedBackup {
                original: target.clone(),
                reason: "path contains the reserved ' | ' delimiter".to_string(),
            });
            continue;
        }

        // Two targets must never share a snapshot path.
        if !used_dests.insert(dest.clone()) {
            warn!(
                path = %target.display(),
                dest = %dest.display(),
                "Snapshot path collision, not backed up"
            );
            failures.push(FailedBackup {
                original: target.clone(),
                reason: format!("snapshot path collision on '{}'", relative.display()),
            });
            continue;
        }

        let result = dest
            .parent()
            .map(fs::create_dir_all)
            .unwrap_or(Ok(()))
            .and_then(|_| fs::copy(target, &dest));

        match result {
            Ok(_) => {
                let line = format!(
                    "{} | modified | {} | {}\n",
                    target.display(),
                    dest.display(),
                    Utc::now().format("%Y-%m-%d %H:%M:%S"),
                );
                change_log
                    .write_all(line.as_bytes())
                    .map_err(|source| BackupError::ChangeLog {
                        path: change_log_path.clone(),
                        source,
                    })?;
                debug!(original = %target.display(), snapshot = %dest.display(), "Backed up");
                copied.push(CopiedFile {
                    original: target.clone(),
                    snapshot: dest,
                });
            }
            Err(e) => {
                warn!(path = %target.display(), error = %e, "Backup copy failed");
                failures.push(FailedBackup {
                    original: target.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        snapshot = %dir.display(),
        copied = copied.len(),
        failed = failures.len(),
        "Snapshot complete"
    );

    Ok(BackupSnapshot {
        dir,
        copied,
        failures,
    })
}

/// One parsed change-log record.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChangeRecord {
    original: PathBuf,
    snapshot: PathBuf,
}

fn read_change_log(snapshot_dir: &Path) -> Result<Vec<ChangeRecord>, RestoreError> {
    let path = snapshot_dir.join(CHANGE_LOG_FILE_NAME);
    let content = fs::read_to_string(&path).map_err(|e| RestoreError::ChangeLogRead {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let mut records = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.splitn(4, " | ").collect();
        if fields.len() != 4 {
            return Err(RestoreError::ChangeLogRead {
                path,
                reason: format!("malformed record on line {}", number + 1),
            });
        }
        records.push(ChangeRecord {
            original: PathBuf::from(fields[0]),
            snapshot: PathBuf::from(fields[2]),
        });
    }
    Ok(records)
}

/// Restore every file recorded in a snapshot's change log.
///
/// With `target_root` set, files are restored under that root at their
/// snapshot-relative paths instead of their recorded original locations.
///
/// All members are verified present before the first copy, so a restore
/// either applies fully or not at all. Returns the number of files restored.
pub fn restore(snapshot_dir: &Path, target_root: Option<&Path>) -> Result<usize, RestoreError> {
    if !snapshot_dir.is_dir() {
        return Err(RestoreError::SnapshotMissing {
            path: snapshot_dir.to_path_buf(),
        });
    }

    let records = read_change_log(snapshot_dir)?;

    for record in &records {
        if !record.snapshot.is_file() {
            return Err(RestoreError::MemberMissing {
                snapshot: snapshot_dir.to_path_buf(),
                member: record.snapshot.clone(),
            });
        }
    }

    let mut restored = 0;
    for record in &records {
        let dest = match target_root {
            Some(root) => match record.snapshot.strip_prefix(snapshot_dir) {
                Ok(relative) => root.join(relative),
                Err(_) => root.join(
                    record
                        .snapshot
                        .file_name()
                        .unwrap_or(record.snapshot.as_os_str()),
                ),
            },
            None => record.original.clone(),
        };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| RestoreError::Copy {
                member: record.snapshot.clone(),
                dest: dest.clone(),
                source,
            })?;
        }
        fs::copy(&record.snapshot, &dest).map_err(|source| RestoreError::Copy {
            member: record.snapshot.clone(),
            dest: dest.clone(),
            source,
        })?;
        debug!(member = %record.snapshot.display(), dest = %dest.display(), "Restored");
        restored += 1;
    }

    info!(snapshot = %snapshot_dir.display(), restored, "Restore complete");
    Ok(restored)
}
