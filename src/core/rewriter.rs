// logclean - core/rewriter.rs
//
// Pure line-level rewriting: drop every line covered by a matched statement
// span, keep everything else byte-for-byte. No I/O here; callers read and
// write files.

use crate::core::matcher::{self, LoggerNames};
use crate::core::model::{Language, MatchedStatement};

/// Result of rewriting one file's lines.
#[derive(Debug, Clone)]
pub struct RewriteResult {
    /// Surviving lines, in original order, unmodified.
    pub lines: Vec<String>,
    /// The statements that were removed, in source order.
    pub removed: Vec<MatchedStatement>,
}

impl RewriteResult {
    /// Total number of removed lines.
    pub fn lines_removed(&self) -> usize {
        self.removed.iter().map(|m| m.span.len()).sum()
    }

    /// True when nothing matched.
    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Remove all recognised logging/console statements from `lines`.
///
/// One top-to-bottom scan. When a statement is matched at line `i` the scan
/// jumps past its span, so spans never overlap. Lines not covered by any
/// span (blank lines included) are copied through untouched, which makes the
/// rewrite idempotent: cleaning already-clean input returns it unchanged.
pub fn rewrite(lines: &[String], language: Language) -> RewriteResult {
    let mut known = LoggerNames::default();
    let mut kept = Vec::with_capacity(lines.len());
    let mut removed = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        match matcher::match_at(lines, i, language, &mut known) {
            Some(stmt) => {
                i = stmt.span.end + 1;
                removed.push(stmt);
            }
            None => {
                kept.push(lines[i].clone());
                i += 1;
            }
        }
    }

    RewriteResult {
        lines: kept,
        removed,
    }
}

/// Split file content into lines for matching and rewriting.
///
/// `\r` stays attached to its line so CRLF files survive a rewrite intact.
/// Returns the lines plus whether the content ended with a final newline,
/// which `join_lines` needs to reproduce the original tail exactly.
pub fn split_lines(content: &str) -> (Vec<String>, bool) {
    let had_final_newline = content.ends_with('\n');
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    if had_final_newline {
        // split() leaves a synthetic empty element after the last '\n'.
        lines.pop();
    }
    (lines, had_final_newline)
}

/// Inverse of `split_lines`.
pub fn join_lines(lines: &[String], had_final_newline: bool) -> String {
    let mut out = lines.join("\n");
    if had_final_newline && !lines.is_empty() {
        out.push('\n');
    }
    out
}
