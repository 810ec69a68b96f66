// logclean - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Per-file problems (unreadable file, failed backup) are not represented
// here: they are recorded as outcomes in the run summary so one bad file
// never aborts the batch. The enums below cover failures that stop an
// operation outright.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all logclean operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum CleanError {
    /// File discovery failed (invalid root, traversal problem).
    Discovery(DiscoveryError),

    /// A backup snapshot could not be created at all.
    Backup(BackupError),

    /// A restore operation failed.
    Restore(RestoreError),

    /// Crontab scheduling failed.
    Schedule(ScheduleError),
}

impl fmt::Display for CleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Backup(e) => write!(f, "Backup error: {e}"),
            Self::Restore(e) => write!(f, "Restore error: {e}"),
            Self::Schedule(e) => write!(f, "Schedule error: {e}"),
        }
    }
}

impl std::error::Error for CleanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Backup(e) => Some(e),
            Self::Restore(e) => Some(e),
            Self::Schedule(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to file discovery. These are global precondition failures:
/// they abort the invocation before any file is touched.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The target path does not exist.
    RootNotFound { path: PathBuf },

    /// A directory was expected but the path is a regular file (or vice versa).
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// An explicitly listed file has an extension the cleaner cannot handle.
    UnsupportedFileType { path: PathBuf },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Target path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Target path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::UnsupportedFileType { path } => {
                write!(
                    f,
                    "'{}' has an unsupported file type (expected .py, .js, .jsx, .ts, or .tsx)",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for CleanError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Backup errors
// ---------------------------------------------------------------------------

/// Errors that prevent a snapshot from being created at all.
///
/// A single target that cannot be copied is NOT one of these: per-target
/// copy failures are collected inside the snapshot so the remaining targets
/// still get backed up.
#[derive(Debug)]
pub enum BackupError {
    /// The snapshot directory could not be created.
    CreateDir { path: PathBuf, source: io::Error },

    /// The change-log file could not be opened or written.
    ChangeLog { path: PathBuf, source: io::Error },
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(
                    f,
                    "Cannot create snapshot directory '{}': {source}",
                    path.display()
                )
            }
            Self::ChangeLog { path, source } => {
                write!(
                    f,
                    "Cannot write change log '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for BackupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::ChangeLog { source, .. } => Some(source),
        }
    }
}

impl From<BackupError> for CleanError {
    fn from(e: BackupError) -> Self {
        Self::Backup(e)
    }
}

// ---------------------------------------------------------------------------
// Restore errors
// ---------------------------------------------------------------------------

/// Errors raised by snapshot restore. A restore never partially applies:
/// every member is verified present before the first copy happens.
#[derive(Debug)]
pub enum RestoreError {
    /// The snapshot directory does not exist or is not a directory.
    SnapshotMissing { path: PathBuf },

    /// A file listed in the snapshot's change log is missing on disk.
    MemberMissing {
        snapshot: PathBuf,
        member: PathBuf,
    },

    /// The snapshot's change log could not be read or parsed.
    ChangeLogRead { path: PathBuf, reason: String },

    /// Copying a member back to its original location failed.
    Copy {
        member: PathBuf,
        dest: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SnapshotMissing { path } => {
                write!(f, "Snapshot directory '{}' does not exist", path.display())
            }
            Self::MemberMissing { snapshot, member } => write!(
                f,
                "Snapshot '{}' is missing member file '{}'; nothing was restored",
                snapshot.display(),
                member.display()
            ),
            Self::ChangeLogRead { path, reason } => {
                write!(f, "Cannot read change log '{}': {reason}", path.display())
            }
            Self::Copy {
                member,
                dest,
                source,
            } => write!(
                f,
                "Failed to restore '{}' to '{}': {source}",
                member.display(),
                dest.display()
            ),
        }
    }
}

impl std::error::Error for RestoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Copy { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RestoreError> for CleanError {
    fn from(e: RestoreError) -> Self {
        Self::Restore(e)
    }
}

// ---------------------------------------------------------------------------
// Schedule errors
// ---------------------------------------------------------------------------

/// Errors related to crontab-based scheduling.
#[derive(Debug)]
pub enum ScheduleError {
    /// The `crontab` binary could not be invoked.
    CrontabUnavailable { source: io::Error },

    /// `crontab -` rejected the new table.
    CrontabWrite { detail: String },

    /// Scheduling is not supported on this platform.
    Unsupported,

    /// The hour/minute arguments are out of range.
    InvalidTime { hour: u8, minute: u8 },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrontabUnavailable { source } => {
                write!(f, "Cannot invoke crontab: {source}")
            }
            Self::CrontabWrite { detail } => {
                write!(f, "crontab rejected the updated table: {detail}")
            }
            Self::Unsupported => {
                write!(f, "Scheduling requires a Unix host with crontab")
            }
            Self::InvalidTime { hour, minute } => {
                write!(f, "Invalid schedule time {hour:02}:{minute:02} (hour 0-23, minute 0-59)")
            }
        }
    }
}

impl std::error::Error for ScheduleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CrontabUnavailable { source } => Some(source),
            _ => None,
        }
    }
}

impl From<ScheduleError> for CleanError {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

/// Convenience type alias for logclean results.
pub type Result<T> = std::result::Result<T, CleanError>;
