//! Git-based change detection: which files should drive the capture run.

use std::path::Path;
use std::process::Command;

/// Sentinel branch value meaning "compare the working tree", i.e. the
/// union of unstaged, staged, and untracked files.
pub const UNCOMMITTED: &str = "UNCOMMITTED";

/// Path fragments that mark a file as irrelevant to UI review.
const SKIP_FRAGMENTS: &[&str] = &[
    "/tests/",
    "/test/",
    "/Tests/",
    "/__tests__/",
    "/__mocks__/",
    "/spec/",
    "/node_modules/",
    "/dist/",
    "/build/",
    "/out/",
    "/vendor/",
    "/target/",
    "/coverage/",
    "/.difflens/",
    "/.git/",
];

const SKIP_SUFFIXES: &[&str] = &[
    ".test.ts",
    ".test.tsx",
    ".test.js",
    ".test.jsx",
    ".spec.ts",
    ".spec.tsx",
    ".spec.js",
    ".spec.jsx",
    "_test.py",
    "_test.go",
    "Test.java",
    "Test.php",
    ".md",
    ".txt",
    ".lock",
    ".snap",
    ".map",
];

const SKIP_FILE_NAMES: &[&str] = &[
    "LICENSE",
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "composer.json",
    "Cargo.lock",
    "tsconfig.json",
    "jest.config.js",
    "vitest.config.ts",
];

/// Changed files surviving the relevance filter, plus how many were
/// filtered away (for verbose reporting).
#[derive(Debug, Default)]
pub struct Detection {
    pub files: Vec<String>,
    pub filtered_out: usize,
}

pub fn is_git_repository(dir: &Path) -> bool {
    git_cmd(dir, &["rev-parse", "--git-dir"]).is_some()
}

/// Detect changed files against `branch`, or against the working tree for
/// [`UNCOMMITTED`].
pub fn detect(dir: &Path, branch: &str) -> Detection {
    let raw = if branch == UNCOMMITTED {
        uncommitted_files(dir)
    } else {
        lines_of(git_cmd(dir, &["diff", "--name-only", branch]))
    };

    let mut detection = Detection::default();
    for file in raw {
        if is_relevant(&file) {
            detection.files.push(file);
        } else {
            detection.filtered_out += 1;
        }
    }
    detection
}

/// Unstaged, staged, and untracked files, deduplicated in first-seen order.
fn uncommitted_files(dir: &Path) -> Vec<String> {
    let listings = [
        git_cmd(dir, &["diff", "--name-only"]),
        git_cmd(dir, &["diff", "--name-only", "--cached"]),
        git_cmd(dir, &["ls-files", "--others", "--exclude-standard"]),
    ];

    let mut files: Vec<String> = Vec::new();
    for listing in listings {
        for file in lines_of(listing) {
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }
    files
}

fn lines_of(output: Option<String>) -> Vec<String> {
    output
        .map(|out| {
            out.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Run a git command in `dir`, returning stdout if it succeeds and
/// produced output.
fn git_cmd(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() { None } else { Some(stdout) }
}

/// Whether a changed file can plausibly affect rendered UI.
fn is_relevant(path: &str) -> bool {
    // Anchor with a slash so top-level directories match the fragments.
    let anchored = format!("/{path}");
    if SKIP_FRAGMENTS.iter().any(|f| anchored.contains(f)) {
        return false;
    }
    if SKIP_SUFFIXES.iter().any(|s| path.ends_with(s)) {
        return false;
    }
    let name = path.rsplit('/').next().unwrap_or(path);
    if name.starts_with('.') {
        return false;
    }
    !SKIP_FILE_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_files_are_relevant() {
        assert!(is_relevant("src/app.ts"));
        assert!(is_relevant("src/components/Button.tsx"));
        assert!(is_relevant("styles/main.css"));
        assert!(is_relevant("templates/index.html"));
    }

    #[test]
    fn test_tests_and_docs_are_filtered() {
        assert!(!is_relevant("src/app.test.ts"));
        assert!(!is_relevant("src/__tests__/button.tsx"));
        assert!(!is_relevant("tests/e2e/login.spec.ts"));
        assert!(!is_relevant("README.md"));
        assert!(!is_relevant("docs/notes.txt"));
    }

    #[test]
    fn test_build_output_and_config_are_filtered() {
        assert!(!is_relevant("dist/bundle.js"));
        assert!(!is_relevant("node_modules/react/index.js"));
        assert!(!is_relevant("package.json"));
        assert!(!is_relevant("package-lock.json"));
        assert!(!is_relevant(".env"));
        assert!(!is_relevant("src/.env.local"));
        assert!(!is_relevant(".difflens/screenshots/home.png"));
    }

    #[test]
    fn test_top_level_test_dir_is_filtered() {
        assert!(!is_relevant("test/helper.ts"));
        assert!(!is_relevant("spec/models.rb"));
    }

    #[test]
    fn test_detect_in_real_repo() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let git = |args: &[&str]| {
            let out = Command::new("git").arg("-C").arg(root).args(args).output().unwrap();
            assert!(out.status.success(), "git {args:?}: {}", String::from_utf8_lossy(&out.stderr));
        };
        git(&["init", "-q"]);

        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src/app.ts"), "export {}\n").unwrap();
        std::fs::write(root.join("notes.md"), "# notes\n").unwrap();

        assert!(is_git_repository(root));
        let detection = detect(root, UNCOMMITTED);
        assert_eq!(detection.files, vec!["src/app.ts".to_string()]);
        assert_eq!(detection.filtered_out, 1);
    }

    #[test]
    fn test_detect_outside_repo_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_git_repository(dir.path()));
        let detection = detect(dir.path(), UNCOMMITTED);
        assert!(detection.files.is_empty());
    }
}
