// logclean - core/matcher.rs
//
// Language-specific recognition of logging/console statements.
//
// `match_at` decides whether a statement starts at a given line and, if so,
// how many following lines belong to it (balanced-paren continuation with a
// string-aware scanner). No AST: detection is pattern/heuristic-based and
// deliberately allowed to miss exotic formatting.
//
// Per-file state is limited to the set of known logger names, accumulated in
// a single top-to-bottom scan: a logger variable must be assigned before
// its calls are recognised.

use crate::core::model::{Language, MatchedStatement, StatementSpan};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Python `logging` methods whose calls are removable.
const PY_LOG_METHODS: &[&str] = &[
    "debug",
    "info",
    "warning",
    "warn",
    "error",
    "exception",
    "critical",
    "fatal",
    "log",
];

/// `console` methods whose calls are removable.
const CONSOLE_METHODS: &[&str] = &[
    "log",
    "error",
    "warn",
    "info",
    "debug",
    "trace",
    "dir",
    "dirxml",
    "table",
    "count",
    "countReset",
    "assert",
    "clear",
    "group",
    "groupEnd",
    "groupCollapsed",
    "time",
    "timeEnd",
    "timeLog",
    "profile",
    "profileEnd",
];

// =============================================================================
// Known logger names
// =============================================================================

/// Per-file accumulator of identifiers plausibly bound to a logger.
///
/// Seeded with the conventional names; extended whenever a
/// `name = logging.getLogger(...)` assignment is scanned.
#[derive(Debug, Clone)]
pub struct LoggerNames(HashSet<String>);

impl Default for LoggerNames {
    fn default() -> Self {
        let mut names = HashSet::new();
        names.insert("logger".to_string());
        names.insert("_logger".to_string());
        names.insert("log".to_string());
        Self(names)
    }
}

impl LoggerNames {
    /// Record a name bound by a `logging.getLogger(...)` assignment.
    pub fn insert(&mut self, name: &str) {
        self.0.insert(name.to_string());
    }

    /// True if `name` is plausibly bound to a logger.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

// =============================================================================
// Compiled patterns
// =============================================================================

fn py_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:import\s+logging\b|from\s+logging\s+import\s+\S)")
            .expect("py_import_re: invalid regex")
    })
}

fn py_get_logger_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*logging\.getLogger\s*\(")
            .expect("py_get_logger_re: invalid regex")
    })
}

fn py_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)\s*\(")
            .expect("py_call_re: invalid regex")
    })
}

fn js_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^console\.([A-Za-z]+)\s*\(").expect("js_call_re: invalid regex")
    })
}

// =============================================================================
// Matching
// =============================================================================

/// Decide whether a removable statement starts at `lines[index]`.
///
/// Returns the statement's span (possibly covering several lines) and its
/// classification kind, or `None` when the line is ordinary code. `known`
/// is updated when the line binds a new logger name.
pub fn match_at(
    lines: &[String],
    index: usize,
    language: Language,
    known: &mut LoggerNames,
) -> Option<MatchedStatement> {
    let line = lines.get(index)?;
    let trimmed = line.trim_start().trim_end_matches(['\r']);

    match language {
        Language::Python => match_python(lines, index, trimmed, known),
        Language::JsFamily => match_js(lines, index, trimmed),
    }
}

fn match_python(
    lines: &[String],
    index: usize,
    trimmed: &str,
    known: &mut LoggerNames,
) -> Option<MatchedStatement> {
    // Comment lines are never statement starts.
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    if py_import_re().is_match(trimmed) {
        // `from logging import (...)` may spread over several lines.
        let span = if trimmed.contains('(') {
            statement_span(lines, index, Language::Python)
        } else {
            StatementSpan { start: index, end: index }
        };
        return Some(MatchedStatement {
            span,
            kind: "logging_import".to_string(),
        });
    }

    if let Some(caps) = py_get_logger_re().captures(trimmed) {
        known.insert(&caps[1]);
        return Some(MatchedStatement {
            span: statement_span(lines, index, Language::Python),
            kind: "logger_definition".to_string(),
        });
    }

    if let Some(caps) = py_call_re().captures(trimmed) {
        let ident = &caps[1];
        let method = &caps[2];
        if !PY_LOG_METHODS.contains(&method) {
            return None;
        }
        if ident == "logging" {
            return Some(MatchedStatement {
                span: statement_span(lines, index, Language::Python),
                kind: format!("logging.{method}"),
            });
        }
        if known.contains(ident) {
            return Some(MatchedStatement {
                span: statement_span(lines, index, Language::Python),
                kind: format!("logger.{method}"),
            });
        }
    }

    None
}

fn match_js(lines: &[String], index: usize, trimmed: &str) -> Option<MatchedStatement> {
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return None;
    }

    let caps = js_call_re().captures(trimmed)?;
    let method = &caps[1];
    if !CONSOLE_METHODS.contains(&method) {
        return None;
    }

    Some(MatchedStatement {
        span: statement_span(lines, index, Language::JsFamily),
        kind: format!("console.{method}"),
    })
}

/// Extend a statement start to its full span by scanning forward until the
/// parenthesis depth returns to zero.
///
/// An opening call that never closes (malformed/truncated file) extends to
/// end-of-file, which is degenerate but defined behaviour, not an error.
fn statement_span(lines: &[String], start: usize, language: Language) -> StatementSpan {
    let mut scanner = DepthScanner::new(language);

    for (offset, line) in lines[start..].iter().enumerate() {
        scanner.feed_line(line);
        if scanner.balanced() {
            return StatementSpan {
                start,
                end: start + offset,
            };
        }
    }

    StatementSpan {
        start,
        end: lines.len().saturating_sub(1),
    }
}

// =============================================================================
// Quote/paren depth scanner
// =============================================================================

/// String-literal state during scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    /// Ordinary code: parens are counted, quote characters open strings.
    Normal,
    /// Inside a single-quoted string (one line unless escaped continuation).
    Single,
    /// Inside a double-quoted string (one line unless escaped continuation).
    Double,
    /// Inside a Python triple-quoted string with the given quote character.
    Triple(char),
    /// Inside a JS backtick template literal. `${...}` bodies are treated as
    /// string content: their parens are not counted. Conservative: a span
    /// can end later than the true statement end, never earlier.
    Template,
}

/// Explicit finite-state scanner tracking parenthesis depth across lines
/// while ignoring parens inside string literals.
#[derive(Debug)]
struct DepthScanner {
    language: Language,
    depth: i32,
    opened: bool,
    state: QuoteState,
    escaped: bool,
}

impl DepthScanner {
    fn new(language: Language) -> Self {
        Self {
            language,
            depth: 0,
            opened: false,
            state: QuoteState::Normal,
            escaped: false,
        }
    }

    /// True once the opening paren has been seen and depth is back to zero.
    fn balanced(&self) -> bool {
        self.opened && self.depth == 0 && self.state == QuoteState::Normal
    }

    /// Consume one source line (without its terminator).
    fn feed_line(&mut self, line: &str) {
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            match self.state {
                QuoteState::Normal => {
                    match c {
                        '#' if self.language == Language::Python => break,
                        '/' if self.language == Language::JsFamily
                            && chars.get(i + 1) == Some(&'/') =>
                        {
                            break;
                        }
                        '(' => {
                            self.depth += 1;
                            self.opened = true;
                        }
                        ')' => {
                            // Clamp: a stray closer before any opener stays at 0.
                            self.depth = (self.depth - 1).max(0);
                        }
                        '\'' | '"' => {
                            if self.language == Language::Python
                                && chars.get(i + 1) == Some(&c)
                                && chars.get(i + 2) == Some(&c)
                            {
                                self.state = QuoteState::Triple(c);
                                i += 2;
                            } else if c == '\'' {
                                self.state = QuoteState::Single;
                            } else {
                                self.state = QuoteState::Double;
                            }
                        }
                        '`' if self.language == Language::JsFamily => {
                            self.state = QuoteState::Template;
                        }
                        _ => {}
                    }
                }
                QuoteState::Single | QuoteState::Double => {
                    let quote = if self.state == QuoteState::Single { '\'' } else { '"' };
                    if self.escaped {
                        self.escaped = false;
                    } else if c == '\\' {
                        self.escaped = true;
                    } else if c == quote {
                        self.state = QuoteState::Normal;
                    }
                }
                QuoteState::Triple(q) => {
                    if self.escaped {
                        self.escaped = false;
                    } else if c == '\\' {
                        self.escaped = true;
                    } else if c == q
                        && chars.get(i + 1) == Some(&q)
                        && chars.get(i + 2) == Some(&q)
                    {
                        self.state = QuoteState::Normal;
                        i += 2;
                    }
                }
                QuoteState::Template => {
                    if self.escaped {
                        self.escaped = false;
                    } else if c == '\\' {
                        self.escaped = true;
                    } else if c == '`' {
                        self.state = QuoteState::Normal;
                    }
                }
            }

            i += 1;
        }

        // End of line. A trailing backslash inside a one-line string is a
        // continuation; otherwise an unterminated single/double quote cannot
        // span lines, so fall back to Normal rather than swallowing the rest
        // of the file.
        if self.escaped {
            self.escaped = false;
        } else if matches!(self.state, QuoteState::Single | QuoteState::Double) {
            self.state = QuoteState::Normal;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
