// logclean - tests/e2e_clean.rs
//
// End-to-end tests running the full clean pipelines against real temporary
// directory trees: discovery, rewriting, backup, restore, retention.

use chrono::Utc;
use logclean::app::backup;
use logclean::app::discovery::DiscoveryConfig;
use logclean::app::run::{self, CleanCodeOptions, CleanLogsOptions};
use logclean::core::model::FileStatus;
use logclean::core::retention::RetentionCutoff;
use logclean::util::constants;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) -> std::path::PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(&path, content).expect("write");
    path
}

fn code_options(root: &Path) -> CleanCodeOptions {
    CleanCodeOptions {
        targets: vec![root.to_path_buf()],
        types: None,
        backup: true,
        dry_run: false,
    }
}

#[test]
fn test_clean_python_project_end_to_end() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    let app = write(
        root,
        "app.py",
        "\
import logging

logger = logging.getLogger(__name__)

def handler(event):
    logger.info(f\"got {event}\")
    result = process(event)
    logger.debug(
        \"result: %s\",
        result,
    )
    return result
",
    );
    let untouched = write(root, "pure.py", "def add(a, b):\n    return a + b\n");

    let summary = run::clean_code(&code_options(root), &DiscoveryConfig::default())
        .expect("clean_code");

    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.files_cleaned, 1);
    assert!(!summary.has_failures());
    assert_eq!(
        fs::read_to_string(&app).expect("read"),
        "

def handler(event):
    result = process(event)
    return result
"
    );
    assert_eq!(
        fs::read_to_string(&untouched).expect("read"),
        "def add(a, b):\n    return a + b\n"
    );

    // The originals are all in the snapshot.
    let snap_dir = summary.snapshot_dir.expect("snapshot taken");
    assert!(snap_dir.starts_with(root.join(constants::ASSETS_DIR_NAME)));
    let backed_up = fs::read_to_string(snap_dir.join("app.py")).expect("read snapshot");
    assert!(backed_up.contains("import logging"));
    // Unchanged files are not snapshotted.
    assert!(!snap_dir.join("pure.py").exists());
}

#[test]
fn test_clean_js_multiline_and_template_literals() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    let file = write(
        root,
        "widget.ts",
        "\
export function render(items: string[]) {
  console.group(\"render\");
  const out = items.map((i) => `<li>${i}</li>`);
  console.log(
    `rendered ${out.length} items`,
    out,
  );
  console.groupEnd();
  return out.join(\"\\n\");
}
",
    );

    let mut options = code_options(root);
    options.backup = false;
    let summary = run::clean_code(&options, &DiscoveryConfig::default()).expect("clean_code");

    assert_eq!(summary.files_cleaned, 1);
    assert_eq!(
        fs::read_to_string(&file).expect("read"),
        "\
export function render(items: string[]) {
  const out = items.map((i) => `<li>${i}</li>`);
  return out.join(\"\\n\");
}
"
    );
    assert_eq!(summary.removed_by_kind.get("console.log"), Some(&1));
    assert_eq!(summary.removed_by_kind.get("console.group"), Some(&1));
    assert_eq!(summary.removed_by_kind.get("console.groupEnd"), Some(&1));
}

#[test]
fn test_cleaning_is_idempotent_on_disk() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    write(
        root,
        "svc.py",
        "import logging\nlog = logging.getLogger('svc')\n\ndef f():\n    log.warning('x')\n    return 1\n",
    );

    let mut options = code_options(root);
    options.backup = false;

    run::clean_code(&options, &DiscoveryConfig::default()).expect("first pass");
    let after_first = fs::read_to_string(root.join("svc.py")).expect("read");

    let summary = run::clean_code(&options, &DiscoveryConfig::default()).expect("second pass");
    let after_second = fs::read_to_string(root.join("svc.py")).expect("read");

    assert_eq!(after_first, after_second);
    assert_eq!(summary.files_cleaned, 0);
    assert!(matches!(summary.outcomes[0].status, FileStatus::Unchanged));
}

#[test]
fn test_restore_undoes_a_clean_run() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    let original = "import logging\nlogger.info('x')\nwork()\n";
    let file = write(root, "pkg/job.py", original);

    let summary =
        run::clean_code(&code_options(root), &DiscoveryConfig::default()).expect("clean_code");
    assert_eq!(fs::read_to_string(&file).expect("read"), "work()\n");

    let snap_dir = summary.snapshot_dir.expect("snapshot");
    let restored = backup::restore(&snap_dir, None).expect("restore");
    assert_eq!(restored, 1);
    assert_eq!(fs::read_to_string(&file).expect("read"), original);
}

#[test]
fn test_multi_target_backup_keeps_same_named_files_apart() {
    let dir = TempDir::new().expect("tempdir");
    let proj_a = dir.path().join("proj_a");
    let proj_b = dir.path().join("proj_b");
    let original_a = "logger.info('a')\nvalue = 'A'\n";
    let original_b = "logger.info('b')\nvalue = 'B'\n";
    let a = write(&proj_a, "app.py", original_a);
    let b = write(&proj_b, "app.py", original_b);

    let options = CleanCodeOptions {
        targets: vec![proj_a.clone(), proj_b.clone()],
        types: None,
        backup: true,
        dry_run: false,
    };
    let summary = run::clean_code(&options, &DiscoveryConfig::default()).expect("clean_code");

    assert_eq!(summary.files_cleaned, 2);
    assert!(!summary.has_failures());
    assert_eq!(fs::read_to_string(&a).expect("read"), "value = 'A'\n");
    assert_eq!(fs::read_to_string(&b).expect("read"), "value = 'B'\n");

    // Each file has its own snapshot copy; restoring brings back each
    // project's own pre-clean content.
    let snap_dir = summary.snapshot_dir.expect("snapshot");
    let restored = backup::restore(&snap_dir, None).expect("restore");
    assert_eq!(restored, 2);
    assert_eq!(fs::read_to_string(&a).expect("read"), original_a);
    assert_eq!(fs::read_to_string(&b).expect("read"), original_b);
}

#[test]
fn test_clean_logs_retention_end_to_end() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    let log = write(
        root,
        "service.log",
        "\
2019-05-01 08:00:00 INFO boot
  config loaded
2019-05-01 08:00:01,500 ERROR crash
Traceback (most recent call last):
  ValueError: nope
2031-01-01 00:00:00 INFO future entry
no timestamp trailer
",
    );
    // Not a log file: untouched by log discovery.
    let other = write(root, "notes.txt", "meeting notes from 2019, keep forever\n");

    let options = CleanLogsOptions {
        target: root.to_path_buf(),
        cutoff: RetentionCutoff::instant(Utc::now()),
        backup: true,
        dry_run: false,
    };
    let summary = run::clean_logs(&options, &DiscoveryConfig::default()).expect("clean_logs");

    assert_eq!(summary.files_cleaned, 1);
    assert_eq!(
        fs::read_to_string(&log).expect("read"),
        "2031-01-01 00:00:00 INFO future entry\nno timestamp trailer\n"
    );
    assert_eq!(
        fs::read_to_string(&other).expect("read"),
        "meeting notes from 2019, keep forever\n"
    );

    // Pre-prune content is recoverable from the snapshot.
    let snap_dir = summary.snapshot_dir.expect("snapshot");
    let backed_up = fs::read_to_string(snap_dir.join("service.log")).expect("read snapshot");
    assert!(backed_up.contains("ERROR crash"));
}

#[test]
fn test_dry_run_touches_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    let original = "console.warn('x');\nwork();\n";
    let file = write(root, "a.js", original);

    let mut options = code_options(root);
    options.dry_run = true;
    let summary = run::clean_code(&options, &DiscoveryConfig::default()).expect("clean_code");

    assert_eq!(fs::read_to_string(&file).expect("read"), original);
    assert!(summary.snapshot_dir.is_none(), "dry run takes no backup");
    assert_eq!(summary.lines_removed, 1);
    assert!(!root.join(constants::ASSETS_DIR_NAME).exists());
}

#[test]
fn test_assets_dir_is_never_rescanned() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    write(root, "a.py", "logger.info('x')\nkeep = 1\n");

    // Two consecutive runs: the second must not descend into the first
    // run's backup area.
    run::clean_code(&code_options(root), &DiscoveryConfig::default()).expect("first");
    write(root, "a.py", "logger.info('again')\nkeep = 2\n");
    let summary =
        run::clean_code(&code_options(root), &DiscoveryConfig::default()).expect("second");

    assert_eq!(summary.files_scanned, 1, "only the live a.py is scanned");

    // Each run got its own snapshot directory.
    let backups = root.join(constants::ASSETS_DIR_NAME).join("backup");
    let snapshots: Vec<_> = fs::read_dir(&backups)
        .expect("read backups")
        .map(|e| e.expect("entry").path())
        .collect();
    assert_eq!(snapshots.len(), 2);
}

#[test]
fn test_unreadable_file_fails_without_aborting_batch() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    let good = write(root, "good.py", "logger.error('x')\nkeep = 1\n");
    write(root, "bad.py", "x = 1\n");
    fs::write(root.join("bad.py"), [0xc3, 0x28]).expect("write invalid utf8");

    let mut options = code_options(root);
    options.backup = false;
    let summary = run::clean_code(&options, &DiscoveryConfig::default()).expect("clean_code");

    assert!(summary.has_failures(), "unreadable file must fail the run");
    assert_eq!(summary.failure_count(), 1);
    assert_eq!(fs::read_to_string(&good).expect("read"), "keep = 1\n");
    assert!(summary.outcomes.iter().any(|o| matches!(
        o.status,
        FileStatus::Unreadable { .. }
    )));
}
