//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code
//! - No blocking I/O inside async functions
//! - The session state machine stays free of I/O, runtimes and clocks
//!
//! The helpers here walk the workspace sources and hand each production line
//! to a rule. Test modules (everything from the first `#[cfg(test)]` on) and
//! comments are skipped.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Root of the workspace this package lives in
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// All `.rs` files under `path` (or `path` itself if it is a file)
#[must_use]
pub fn rust_files(path: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// One line of production code
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number
    pub number: usize,
    /// The line with any trailing `//` comment removed
    pub code: &'a str,
    /// Whether the nearest enclosing `fn` is `async`
    pub in_async_fn: bool,
}

/// If `code` declares a function, whether it is async
fn fn_declaration(code: &str) -> Option<bool> {
    const QUALIFIERS: [&str; 6] = ["pub(crate) ", "pub(super) ", "pub ", "const ", "unsafe ", "extern "];

    let mut rest = code.trim_start();
    let mut is_async = false;
    loop {
        if let Some(r) = rest.strip_prefix("async ") {
            is_async = true;
            rest = r;
            continue;
        }
        match QUALIFIERS.iter().find_map(|q| rest.strip_prefix(q)) {
            Some(r) => rest = r,
            None => break,
        }
    }
    rest.starts_with("fn ").then_some(is_async)
}

/// Production lines of a source file
///
/// Stops at the first `#[cfg(test)]`; drops comment-only lines.
#[must_use]
pub fn production_lines(content: &str) -> Vec<SourceLine<'_>> {
    let mut lines = Vec::new();
    let mut in_async_fn = false;

    for (idx, line) in content.lines().enumerate() {
        if line.trim_start().starts_with("#[cfg(test)]") {
            break;
        }

        let code = line.split("//").next().unwrap_or(line);
        if code.trim().is_empty() {
            continue;
        }

        if let Some(is_async) = fn_declaration(code) {
            in_async_fn = is_async;
        }

        lines.push(SourceLine {
            number: idx + 1,
            code,
            in_async_fn,
        });
    }

    lines
}

/// A rule broken at a specific line
#[derive(Clone, Debug)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What was broken
    pub rule: &'static str,
    /// The offending code
    pub code: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.code.trim()
        )
    }
}

/// Apply `rule` to every production line under each of `paths`
///
/// `paths` are relative to the workspace root. Panics if one does not exist,
/// so a moved directory cannot silently disable a check.
pub fn scan<F>(paths: &[&str], rule: F) -> Vec<Violation>
where
    F: Fn(&SourceLine<'_>) -> Option<&'static str>,
{
    let root = workspace_root();
    let mut violations = Vec::new();

    for relative in paths {
        let path = root.join(relative);
        assert!(path.exists(), "{} does not exist", path.display());

        for file in rust_files(&path) {
            let Ok(content) = fs::read_to_string(&file) else {
                continue;
            };
            for line in production_lines(&content) {
                if let Some(broken) = rule(&line) {
                    violations.push(Violation {
                        path: file.clone(),
                        line: line.number,
                        rule: broken,
                        code: line.code.to_string(),
                    });
                }
            }
        }
    }

    violations
}

/// Print violations and fail the calling test if there are any
pub fn report(title: &str, violations: &[Violation], guidance: &[&str]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ CRITICAL: {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    for line in guidance {
        eprintln!("{line}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_declaration_detection() {
        assert_eq!(fn_declaration("fn main() {"), Some(false));
        assert_eq!(fn_declaration("    pub async fn connect(&mut self) {"), Some(true));
        assert_eq!(fn_declaration("pub(crate) fn push(&mut self) {"), Some(false));
        assert_eq!(fn_declaration("    let f = fn_pointer;"), None);
        assert_eq!(fn_declaration("async move {"), None);
    }

    #[test]
    fn test_production_lines_track_async() {
        let source = "\
fn load() {
    std::fs::read_to_string(\"a\");
}

async fn run() {
    // std::fs in a comment
    std::fs::read(\"b\");
}
";
        let lines = production_lines(source);
        let sync_read = lines.iter().find(|l| l.number == 2).unwrap();
        let async_read = lines.iter().find(|l| l.number == 7).unwrap();

        assert!(!sync_read.in_async_fn);
        assert!(async_read.in_async_fn);
        assert!(lines.iter().all(|l| l.number != 6));
    }

    #[test]
    fn test_production_lines_stop_at_tests() {
        let source = "\
fn a() {}
#[cfg(test)]
mod tests {
    fn b() { std::thread::sleep(d); }
}
";
        let lines = production_lines(source);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_workspace_root_contains_core() {
        assert!(workspace_root().join("chat/core/src/lib.rs").exists());
    }
}
