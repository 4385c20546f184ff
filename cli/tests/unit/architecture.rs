//! Structural tests for layer boundaries.
//!
//! These scan the source tree and fail when a module reaches across a layer
//! it must not depend on.

use std::path::{Path, PathBuf};

fn src_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

fn relative(file: &Path) -> String {
    file.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(file)
        .display()
        .to_string()
        .replace('\\', "/")
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

/// Tracks whether a line sits inside a test-only item (`#[cfg(test)]`,
/// `#[cfg(all(test, unix))]`, ...).
struct CfgTestTracker {
    pending: bool,
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            pending: false,
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.starts_with("#[cfg(") && trimmed.contains("test") {
            self.pending = true;
            return true;
        }
        if self.pending && !trimmed.starts_with("#[") {
            self.pending = false;
            // `#[cfg(test)] mod tests;` has no body to track.
            if !trimmed.contains('{') && trimmed.ends_with(';') {
                return true;
            }
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        let inside = self.in_test_block || self.pending;
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        inside
    }
}

/// Non-comment lines outside test-only items, numbered from 1.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut tracker = CfgTestTracker::new();
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !tracker.process_line(line) && !is_comment(line))
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

/// Every production line in `dir` containing one of `needles`.
fn scan(dir: &Path, needles: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = relative(&file);
        for (lineno, line) in production_lines(&file) {
            if let Some(needle) = needles.iter().find(|n| line.contains(**n)) {
                violations.push(format!("{rel}:{lineno}: `{needle}`: {}", line.trim()));
            }
        }
    }
    violations
}

// ── Domain ────────────────────────────────────────────────────────────────────

#[test]
fn domain_is_synchronous_and_free_of_io() {
    let violations = scan(
        &src_dir().join("domain"),
        &[
            "tokio",
            "std::fs",
            "std::process",
            "std::net",
            "reqwest",
            "async fn",
            "crate::application",
            "crate::infra",
            "crate::output",
            "crate::commands",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay pure and synchronous:\n{}",
        violations.join("\n")
    );
}

// ── Application ───────────────────────────────────────────────────────────────

#[test]
fn application_has_no_infra_or_output_imports() {
    let violations = scan(
        &src_dir().join("application"),
        &["crate::infra", "crate::output", "crate::commands", "crate::app::"],
    );
    assert!(
        violations.is_empty(),
        "application/ depends only on domain and ports:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_has_no_blocking_io() {
    let violations = scan(
        &src_dir().join("application"),
        &["std::fs", "std::process::Command", "std::net", "std::thread::sleep", "println!", "eprintln!"],
    );
    assert!(
        violations.is_empty(),
        "application/ must reach the outside world through ports:\n{}",
        violations.join("\n")
    );
}

#[test]
fn services_take_ports_not_adapters() {
    let violations = scan(
        &src_dir().join("application").join("services"),
        &[
            "TokioCommandRunner",
            "SshfsMounter",
            "SshExecutor",
            "ZcliExecutor",
            "ReqwestLogFetcher",
            "ReqwestHttpProbe",
            "YamlConfigStore",
        ],
    );
    assert!(
        violations.is_empty(),
        "services must be generic over port traits:\n{}",
        violations.join("\n")
    );
}

// ── Infra ─────────────────────────────────────────────────────────────────────

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let violations = scan(
        &src_dir().join("infra"),
        &["crate::commands", "crate::output", "crate::app::"],
    );
    assert!(
        violations.is_empty(),
        "infra/ must not depend on presentation:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    let violations = scan(
        &src_dir().join("infra"),
        &["println!", "eprintln!", "print!(", "eprint!("],
    );
    assert!(
        violations.is_empty(),
        "infra/ reports through tracing, never stdout/stderr:\n{}",
        violations.join("\n")
    );
}

#[test]
fn no_tokio_command_runner_new_outside_infra() {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir()) {
        let rel = relative(&file);
        if rel.contains("/infra/") {
            continue;
        }
        for (lineno, line) in production_lines(&file) {
            if line.contains("TokioCommandRunner::new") {
                violations.push(format!("{rel}:{lineno}: {}", line.trim()));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "construct runners through the adapters' system() constructors:\n{}",
        violations.join("\n")
    );
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[test]
fn no_inline_json_branching_in_commands() {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir().join("commands")) {
        let rel = relative(&file);
        for (lineno, line) in production_lines(&file) {
            let trimmed = line.trim();
            if line.contains("json: bool")
                || trimmed.starts_with("if json")
                || trimmed.starts_with("if !json")
                || line.contains("serde_json::to_string")
            {
                violations.push(format!("{rel}:{lineno}: {trimmed}"));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "commands render through app.renderer():\n{}",
        violations.join("\n")
    );
}

#[test]
fn command_handlers_accept_app_context() {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir().join("commands")) {
        let rel = relative(&file);
        let lines = production_lines(&file);
        for (i, (lineno, line)) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if !(trimmed.starts_with("pub fn ") || trimmed.starts_with("pub async fn ")) {
                continue;
            }
            // Signatures may wrap; read up to the opening brace.
            let signature: String = lines[i..]
                .iter()
                .map(|(_, l)| l.trim())
                .scan(false, |done, l| {
                    if *done {
                        return None;
                    }
                    *done = l.contains('{');
                    Some(l)
                })
                .collect::<Vec<_>>()
                .join(" ");
            if !signature.contains("app: &AppContext") {
                violations.push(format!("{rel}:{lineno}: {trimmed}"));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "command handlers take `app: &AppContext` as their first parameter:\n{}",
        violations.join("\n")
    );
}
