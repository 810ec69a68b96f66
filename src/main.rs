// logclean - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading and logging initialisation
// 3. Subcommand dispatch
// 4. Run report printing and process exit code

use clap::{Parser, Subcommand};
use logclean::app::discovery::DiscoveryConfig;
use logclean::app::{backup, run, schedule};
use logclean::core::model::{CleanSummary, FileStatus};
use logclean::core::retention::RetentionCutoff;
use logclean::platform;
use logclean::util;
use std::path::PathBuf;

/// logclean - remove logging statements from source code and prune aged
/// entries from log files, with backup-before-modify safety.
#[derive(Parser, Debug)]
#[command(name = "logclean", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Path to an alternative config file.
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove logging/console statements from source files.
    CleanCode {
        /// Files and/or directories to clean.
        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Only clean these extensions (comma-separated, e.g. "py,ts").
        #[arg(long, value_delimiter = ',')]
        types: Option<Vec<String>>,

        /// Skip the backup snapshot (dangerous).
        #[arg(long)]
        no_backup: bool,

        /// Report what would change without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Drop log entries older than a cutoff from log files.
    CleanLogs {
        /// Log file or directory of log files.
        target: PathBuf,

        /// Drop entries older than this many days.
        #[arg(long, conflicts_with = "before")]
        days: Option<u32>,

        /// Drop entries before this date (YYYY-MM-DD, midnight UTC).
        #[arg(long)]
        before: Option<chrono::NaiveDate>,

        /// Skip the backup snapshot (dangerous).
        #[arg(long)]
        no_backup: bool,

        /// Report what would change without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Restore every file recorded in a backup snapshot.
    Restore {
        /// Snapshot directory (under <root>/lc-cleaned-assets/backup/).
        snapshot: PathBuf,

        /// Restore under this root instead of the original locations.
        #[arg(long)]
        into: Option<PathBuf>,
    },

    /// Install a daily crontab job that prunes aged entries from a log
    /// directory.
    Schedule {
        /// Directory whose log files the job will prune.
        log_dir: PathBuf,

        /// Hour of day to run (0-23).
        #[arg(long, default_value_t = 3)]
        hour: u8,

        /// Minute to run (0-59).
        #[arg(long, default_value_t = 0)]
        minute: u8,
    },

    /// Remove every crontab job previously installed by logclean.
    Unschedule,
}

fn main() {
    let cli = Cli::parse();

    let paths = platform::config::PlatformPaths::resolve();
    let (config, config_warnings) =
        platform::config::load_config(&paths.config_dir, cli.config.as_deref());

    util::logging::init(cli.debug, config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "logclean starting"
    );

    let discovery_config = DiscoveryConfig {
        max_depth: config.max_depth,
        max_files: config.max_files,
        exclude_patterns: config.exclude_patterns.clone(),
    };

    let exit_code = match dispatch(cli.command, &config, &discovery_config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Operation failed");
            eprintln!("Error: {e}");
            1
        }
    };

    std::process::exit(exit_code);
}

fn dispatch(
    command: Command,
    config: &platform::config::AppConfig,
    discovery_config: &DiscoveryConfig,
) -> util::error::Result<i32> {
    match command {
        Command::CleanCode {
            targets,
            types,
            no_backup,
            dry_run,
        } => {
            let options = run::CleanCodeOptions {
                targets,
                types,
                backup: !no_backup,
                dry_run,
            };
            let summary = run::clean_code(&options, discovery_config)?;
            print_summary(&summary, dry_run);
            Ok(i32::from(summary.has_failures()))
        }

        Command::CleanLogs {
            target,
            days,
            before,
            no_backup,
            dry_run,
        } => {
            let cutoff = match (days, before) {
                (_, Some(date)) => RetentionCutoff::date(date),
                (Some(days), None) => RetentionCutoff::days(days),
                (None, None) => RetentionCutoff::days(config.retention_days),
            };
            let options = run::CleanLogsOptions {
                target,
                cutoff,
                backup: !no_backup,
                dry_run,
            };
            let summary = run::clean_logs(&options, discovery_config)?;
            print_summary(&summary, dry_run);
            Ok(i32::from(summary.has_failures()))
        }

        Command::Restore { snapshot, into } => {
            let restored = backup::restore(&snapshot, into.as_deref())?;
            println!("Restored {restored} file(s) from {}", snapshot.display());
            Ok(0)
        }

        Command::Schedule {
            log_dir,
            hour,
            minute,
        } => {
            let entry = schedule::install(&log_dir, hour, minute)?;
            println!("Installed crontab entry:");
            println!("  {entry}");
            Ok(0)
        }

        Command::Unschedule => {
            let removed = schedule::remove_all()?;
            println!("Removed {removed} scheduled entr{}", if removed == 1 { "y" } else { "ies" });
            Ok(0)
        }
    }
}

/// Print the run report to stdout (logging goes to stderr).
fn print_summary(summary: &CleanSummary, dry_run: bool) {
    let verb = if dry_run { "Would clean" } else { "Cleaned" };
    let changed = summary
        .outcomes
        .iter()
        .filter(|o| {
            matches!(
                o.status,
                FileStatus::Cleaned { .. } | FileStatus::WouldClean { .. }
            )
        })
        .count();
    println!(
        "{verb} {changed} of {} file(s), {} line(s) removed",
        summary.files_scanned, summary.lines_removed,
    );

    if !summary.removed_by_kind.is_empty() {
        let mut kinds: Vec<(&String, &usize)> = summary.removed_by_kind.iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        println!("Statements removed by kind:");
        for (kind, count) in kinds {
            println!("  {kind}: {count}");
        }
    }

    if let Some(dir) = &summary.snapshot_dir {
        println!("Backup snapshot: {}", dir.display());
    }

    for outcome in &summary.outcomes {
        match &outcome.status {
            FileStatus::Unreadable { reason } => {
                println!("SKIPPED {} (unreadable: {reason})", outcome.path.display());
            }
            FileStatus::BackupFailed { reason } => {
                println!(
                    "FAILED {} (backup failed, not modified: {reason})",
                    outcome.path.display()
                );
            }
            FileStatus::WriteFailed { reason } => {
                println!("FAILED {} (write failed: {reason})", outcome.path.display());
            }
            _ => {}
        }
    }

    if summary.has_failures() {
        println!("{} file(s) failed", summary.failure_count());
    }
}
