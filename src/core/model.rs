// logclean - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no CLI,
// no platform dependencies. These types are the shared vocabulary
// across all layers.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// =============================================================================
// Language
// =============================================================================

/// Source language family, derived from the file extension.
///
/// Unrecognised extensions map to `None` and are skipped by the rewriter
/// (not an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// `.py` -- Python `logging` statements.
    Python,
    /// `.js`, `.jsx`, `.ts`, `.tsx` -- `console.*` statements.
    JsFamily,
}

impl Language {
    /// Map a path's extension to a language tag.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::from_extension(&ext)
    }

    /// Map a bare extension (without the leading dot) to a language tag.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Self::Python),
            "js" | "jsx" | "ts" | "tsx" => Some(Self::JsFamily),
            _ => None,
        }
    }

    /// Human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::JsFamily => "JavaScript/TypeScript",
        }
    }
}

// =============================================================================
// Statement span
// =============================================================================

/// A contiguous inclusive line range `[start, end]` forming one removable
/// logging/console statement. Invariant: `end >= start`; spans within one
/// file never overlap; spans are computed against the original lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementSpan {
    /// Zero-based index of the first line of the statement.
    pub start: usize,
    /// Zero-based index of the last line of the statement (inclusive).
    pub end: usize,
}

impl StatementSpan {
    /// Number of lines covered by the span.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Spans are never empty; provided for clippy symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A recognised statement: its line span plus a classification label used
/// for the removed-statements-by-kind report (e.g. "console.log",
/// "logger.info", "logging_import", "logger_definition").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedStatement {
    pub span: StatementSpan,
    pub kind: String,
}

// =============================================================================
// Log entry
// =============================================================================

/// One logical unit of a log file: an entry-start line plus any continuation
/// lines that follow it (stack traces, wrapped messages).
///
/// Invariant: concatenating all entries' `raw` text in `ordinal` order
/// reproduces the original file content byte-for-byte. `raw` therefore keeps
/// its line terminators exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Original position of the entry within its file (0-based).
    pub ordinal: usize,

    /// Parsed timestamp in UTC. `None` when the entry had no recognisable
    /// timestamp or the matched text failed to parse; such entries are
    /// always retained by the retention filter.
    pub timestamp: Option<DateTime<Utc>>,

    /// Raw entry text, line terminators included.
    pub raw: String,
}

// =============================================================================
// Run summary
// =============================================================================

/// Outcome of processing one targeted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Statements/entries were removed and the file was rewritten.
    Cleaned { lines_removed: usize },

    /// Nothing matched; the file was left untouched.
    Unchanged,

    /// Dry run: removals were counted but not written.
    WouldClean { lines_removed: usize },

    /// The file could not be read (permissions, encoding); skipped.
    Unreadable { reason: String },

    /// The backup copy failed, so the destructive rewrite was refused.
    BackupFailed { reason: String },

    /// The rewrite itself failed after a successful backup.
    WriteFailed { reason: String },
}

impl FileStatus {
    /// True for outcomes that must drive a non-zero process exit.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Unreadable { .. } | Self::BackupFailed { .. } | Self::WriteFailed { .. }
        )
    }
}

/// Per-file record in the run summary.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Summary statistics for a completed clean operation.
#[derive(Debug, Clone, Default)]
pub struct CleanSummary {
    /// Files examined (after discovery filtering).
    pub files_scanned: usize,

    /// Files actually rewritten.
    pub files_cleaned: usize,

    /// Total lines removed across all files.
    pub lines_removed: usize,

    /// Removed statements counted by kind (clean-code only).
    pub removed_by_kind: HashMap<String, usize>,

    /// Per-file outcomes in processing order.
    pub outcomes: Vec<FileOutcome>,

    /// Snapshot directory, when a backup was taken.
    pub snapshot_dir: Option<PathBuf>,
}

impl CleanSummary {
    /// Record an outcome, folding it into the aggregate counters.
    pub fn record(&mut self, path: PathBuf, status: FileStatus) {
        self.files_scanned += 1;
        match &status {
            FileStatus::Cleaned { lines_removed } => {
                self.files_cleaned += 1;
                self.lines_removed += lines_removed;
            }
            FileStatus::WouldClean { lines_removed } => {
                self.lines_removed += lines_removed;
            }
            _ => {}
        }
        self.outcomes.push(FileOutcome { path, status });
    }

    /// Fold a batch of removed statements into the by-kind counters.
    pub fn count_statements(&mut self, removed: &[MatchedStatement]) {
        for stmt in removed {
            *self.removed_by_kind.entry(stmt.kind.clone()).or_insert(0) += 1;
        }
    }

    /// True when any file could not be backed up, read, or rewritten.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.status.is_failure())
    }

    /// Number of failed files.
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status.is_failure())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            Language::from_path(Path::new("a/b/app.py")),
            Some(Language::Python)
        );
        assert_eq!(
            Language::from_path(Path::new("ui.TSX")),
            Some(Language::JsFamily)
        );
        assert_eq!(Language::from_path(Path::new("notes.txt")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_span_len() {
        let span = StatementSpan { start: 3, end: 3 };
        assert_eq!(span.len(), 1);
        let span = StatementSpan { start: 2, end: 5 };
        assert_eq!(span.len(), 4);
    }

    #[test]
    fn test_summary_counters_and_failures() {
        let mut summary = CleanSummary::default();
        summary.record(
            PathBuf::from("a.py"),
            FileStatus::Cleaned { lines_removed: 3 },
        );
        summary.record(PathBuf::from("b.py"), FileStatus::Unchanged);
        summary.record(
            PathBuf::from("c.py"),
            FileStatus::Unreadable {
                reason: "permission denied".into(),
            },
        );

        assert_eq!(summary.files_scanned, 3);
        assert_eq!(summary.files_cleaned, 1);
        assert_eq!(summary.lines_removed, 3);
        assert!(summary.has_failures());
        assert_eq!(summary.failure_count(), 1);
    }
}
