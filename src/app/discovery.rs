// logclean - app/discovery.rs
//
// Recursive target discovery for clean runs.
//
// Per-entry I/O errors are non-fatal and collected as warnings; only an
// invalid root aborts discovery. Exclude patterns short-circuit directory
// descent via filter_entry so excluded subtrees (node_modules/, .git/) are
// never traversed at all. The assets directory is always skipped so a clean
// run can never eat its own backups.

use crate::core::model::Language;
use crate::core::segment;
use crate::util::constants;
use crate::util::error::DiscoveryError;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation. Limits reference named constants
/// from `util::constants` so they are auditable in one place.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of matching files to return before stopping.
    pub max_files: usize,

    /// Glob patterns matched against filenames AND directory component names.
    /// Matching files are skipped; matching directories are not descended into.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// What kind of files a discovery pass is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Source files in a supported language (clean-code).
    Source,
    /// Log files by extension, name pattern, or content sniff (clean-logs).
    Logs,
}

// =============================================================================
// Discovery
// =============================================================================

/// Verify a discovery root exists and is a directory.
///
/// `fs::metadata` rather than `Path::is_dir()` so PermissionDenied is
/// distinguishable from a path that genuinely does not exist.
fn preflight(root: &Path) -> Result<(), DiscoveryError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        }),
    }
}

/// Discover files of `kind` under `root`, applying exclude glob patterns.
///
/// Returns the accepted paths in walk order plus non-fatal warnings. Fails
/// only when the root itself is invalid.
pub fn discover_files(
    root: &Path,
    kind: TargetKind,
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>), DiscoveryError> {
    preflight(root)?;

    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        ?kind,
        max_depth,
        max_files,
        exclude = ?config.exclude_patterns,
        "Discovery starting"
    );

    let exclude_pats = compile_patterns(&config.exclude_patterns);

    let mut files: Vec<PathBuf> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.file_type().is_dir() {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_str().unwrap_or("");
                // Never descend into the assets area: it holds the backups.
                if name == constants::ASSETS_DIR_NAME {
                    return false;
                }
                return !is_excluded_component(name, &exclude_pats);
            }
            true
        });

    for entry_result in walker {
        if files.len() >= max_files {
            warnings.push(format!(
                "File limit of {max_files} reached; remaining files were not scanned"
            ));
            tracing::info!(limit = max_files, "Discovery stopped at file limit");
            break;
        }

        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        if is_excluded_filename(file_name, &exclude_pats) {
            tracing::trace!(file = file_name, "Excluded by pattern");
            continue;
        }

        let accepted = match kind {
            TargetKind::Source => Language::from_path(path).is_some(),
            TargetKind::Logs => is_log_file(path),
        };
        if accepted {
            files.push(path.to_path_buf());
        }
    }

    tracing::debug!(
        found = files.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((files, warnings))
}

/// Resolve explicit CLI targets into a flat file list.
///
/// Directory targets are walked with `discover_files`; file targets are
/// validated for a supported extension. Mixing files and directories is fine.
pub fn resolve_source_targets(
    targets: &[PathBuf],
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>), DiscoveryError> {
    let mut files = Vec::new();
    let mut warnings = Vec::new();

    for target in targets {
        let meta = std::fs::metadata(target).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                DiscoveryError::PermissionDenied {
                    path: target.clone(),
                    source: e,
                }
            } else {
                DiscoveryError::RootNotFound {
                    path: target.clone(),
                }
            }
        })?;

        if meta.is_dir() {
            let (mut found, mut warns) = discover_files(target, TargetKind::Source, config)?;
            files.append(&mut found);
            warnings.append(&mut warns);
        } else if Language::from_path(target).is_some() {
            files.push(target.clone());
        } else {
            return Err(DiscoveryError::UnsupportedFileType {
                path: target.clone(),
            });
        }
    }

    Ok((files, warnings))
}

// =============================================================================
// Log file detection
// =============================================================================

fn log_name_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        constants::LOG_FILENAME_PATTERNS
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(pattern = p, error = %e, "Invalid log name pattern, skipping");
                    None
                }
            })
            .collect()
    })
}

/// Decide whether `path` looks like a log file.
///
/// Cheapest check first: known extensions, then rotated-log name patterns,
/// and finally a content sniff of the first few lines for a recognised
/// entry-start timestamp. Unreadable files sniff as non-logs.
pub fn is_log_file(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if constants::LOG_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            return true;
        }
    }

    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if log_name_patterns().iter().any(|re| re.is_match(name)) {
            return true;
        }
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    BufReader::new(file)
        .lines()
        .take(constants::LOG_SNIFF_LINES)
        .map_while(|line| line.ok())
        .any(|line| segment::matches_entry_start(&line))
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile glob pattern strings, logging and skipping any that fail.
fn compile_patterns(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// True if `dir_name` matches an exclude pattern with no wildcard characters.
/// Literal patterns act as directory component exclusions ("node_modules",
/// ".git"); wildcard patterns only apply to filenames.
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

/// True if `file_name` matches any exclude pattern (wildcard or literal).
fn is_excluded_filename(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

// =============================================================================
// Tests
// =============================================================================
