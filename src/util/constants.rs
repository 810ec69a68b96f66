// logclean - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "logclean";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "logclean";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Maximum number of files to process in a single invocation.
pub const DEFAULT_MAX_FILES: usize = 10_000;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 100_000;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Default exclude patterns for directory traversal. Literal names are
/// matched against directory components (descent is skipped entirely);
/// wildcard patterns are matched against filenames only.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
    "*.min.js",
];

// =============================================================================
// Assets / backup layout
// =============================================================================

/// Name of the assets directory created at the clean root. Backups and the
/// per-snapshot change log live under it; files inside it are never cleaned.
pub const ASSETS_DIR_NAME: &str = "lc-cleaned-assets";

/// Backup subdirectory inside the assets directory.
pub const BACKUP_DIR_NAME: &str = "backup";

/// Per-snapshot change-log file name.
pub const CHANGE_LOG_FILE_NAME: &str = "changes.log";

/// Timestamp format for snapshot directory names (compact ISO 8601,
/// filesystem-safe on all platforms).
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

// =============================================================================
// Log-file identification
// =============================================================================

/// File extensions treated as log files without further inspection.
pub const LOG_EXTENSIONS: &[&str] = &["log", "logs", "error", "debug", "info"];

/// Filename patterns (regex, matched against the file name) that identify
/// rotated or suffixed log files.
pub const LOG_FILENAME_PATTERNS: &[&str] = &[
    r"\.log(\.\d+)?$",        // app.log, app.log.1, app.log.2
    r"\.log\.[0-9A-Za-z-]+$", // app.log.old, app.log.backup
];

/// Number of lines sampled from the start of a file when deciding whether
/// a file with an unrecognised extension holds log content (timestamp sniff).
pub const LOG_SNIFF_LINES: usize = 5;

// =============================================================================
// Retention
// =============================================================================

/// Default retention window in days when a scheduled job runs without an
/// explicit cutoff.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Hard upper bound on the retention day count (guards against typos like
/// `--days 36500000` silently producing a cutoff before the epoch).
pub const MAX_RETENTION_DAYS: u32 = 36_500;

// =============================================================================
// Scheduling
// =============================================================================

/// Comment tag prefix used to identify crontab entries owned by logclean.
pub const CRON_COMMENT_BASE: &str = "logclean-automated";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
