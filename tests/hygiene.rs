//! Hygiene checks run at test time.
//!
//! Scans the library sources (test files excluded) for patterns that panic or
//! drop errors on the floor. Every budget is zero; a new hit fails the build.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

/// (pattern, budget, why it is banned)
const BUDGETS: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "panics on None/Err"),
    (".expect(", 0, "panics on None/Err"),
    ("panic!(", 0, "crashes the host page"),
    ("unreachable!(", 0, "crashes the host page"),
    ("todo!(", 0, "unfinished code"),
    ("unimplemented!(", 0, "unfinished code"),
    ("let _ =", 0, "discards a value without inspecting it"),
    (".ok()", 0, "discards an error"),
    ("#[allow(dead_code)]", 0, "hides unused code"),
];

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("lib.rs")), "run from the crate root");
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for &(pattern, budget, why) in BUDGETS {
        let found = hits(&files, pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget {
            let detail = found.iter().map(|(p, c)| format!("    {p}: {c}")).collect::<Vec<_>>().join("\n");
            failures.push(format!("`{pattern}` ({why}): found {count}, max {budget}\n{detail}"));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}

#[test]
fn test_modules_live_in_test_files() {
    // Inline `mod tests { ... }` blocks would be scanned as production code.
    let files = source_files();
    let inline: Vec<_> = files.iter().filter(|f| f.content.contains("mod tests {")).map(|f| f.path.as_str()).collect();
    assert!(inline.is_empty(), "move inline test modules to *_test.rs: {inline:?}");
}
