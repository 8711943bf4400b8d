use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn make_home() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn run_in(home: &Path, cwd: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_difflens"));
    cmd.args(args)
        .current_dir(cwd)
        .env("HOME", home)
        .env("NO_COLOR", "1");
    cmd.output().expect("run difflens")
}

fn run_git(cwd: &Path, home: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("HOME", home)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn init_repo(dir: &Path, home: &Path) {
    run_git(dir, home, &["init", "-q"]);
    run_git(dir, home, &["config", "user.email", "test@example.com"]);
    run_git(dir, home, &["config", "user.name", "Test"]);
    run_git(dir, home, &["config", "commit.gpgsign", "false"]);
}

const VALID_DOC: &str = "\
# Fixture App

## Development Server

Command: npm run dev
URL: http://localhost:3000

## Screenshot Settings

### Viewports
- desktop: 1440x900

### Themes
- light
";

#[test]
fn test_dry_run_lists_changes_and_prompt() {
    let home = make_home();
    let project = tempfile::tempdir().expect("tempdir");
    init_repo(project.path(), home.path());

    fs::write(project.path().join("DIFFLENS.md"), VALID_DOC).expect("write doc");
    fs::create_dir_all(project.path().join("src")).expect("mkdir");
    fs::write(project.path().join("src/app.ts"), "export {}\n").expect("write source");

    let out = run_in(
        home.path(),
        project.path(),
        &["--dry-run", "--skip-update-check"],
    );
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Changed files"));
    assert!(stdout.contains("src/app.ts"));
    assert!(stdout.contains("Dry run"));
    // The capture prompt embeds the config document.
    assert!(stdout.contains("Command: npm run dev"));
}

#[test]
fn test_branch_flag_diffs_against_ref() {
    let home = make_home();
    let project = tempfile::tempdir().expect("tempdir");
    init_repo(project.path(), home.path());

    fs::write(project.path().join("DIFFLENS.md"), VALID_DOC).expect("write doc");
    fs::create_dir_all(project.path().join("src")).expect("mkdir");
    fs::write(project.path().join("src/page.tsx"), "v1\n").expect("write source");
    run_git(project.path(), home.path(), &["add", "."]);
    run_git(project.path(), home.path(), &["commit", "-q", "-m", "one"]);
    fs::write(project.path().join("src/page.tsx"), "v2\n").expect("rewrite source");
    run_git(project.path(), home.path(), &["add", "."]);
    run_git(project.path(), home.path(), &["commit", "-q", "-m", "two"]);

    let out = run_in(
        home.path(),
        project.path(),
        &["--dry-run", "--skip-update-check", "--branch", "HEAD~1"],
    );
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("src/page.tsx"));
    assert!(stdout.contains("HEAD~1"));
}

#[test]
fn test_no_relevant_changes_exits_cleanly() {
    let home = make_home();
    let project = tempfile::tempdir().expect("tempdir");
    init_repo(project.path(), home.path());
    fs::write(project.path().join("DIFFLENS.md"), VALID_DOC).expect("write doc");
    // Only filtered files change: docs and lockfiles.
    fs::write(project.path().join("README.md"), "# readme\n").expect("write readme");

    let out = run_in(
        home.path(),
        project.path(),
        &["--dry-run", "--skip-update-check"],
    );
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("nothing to capture"));
    assert!(!stdout.contains("Dry run"));
}

#[test]
fn test_missing_doc_points_to_init() {
    let home = make_home();
    let project = tempfile::tempdir().expect("tempdir");
    init_repo(project.path(), home.path());

    let out = run_in(home.path(), project.path(), &["--skip-update-check"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("DIFFLENS.md"));
    assert!(stderr.contains("difflens init"));
}

#[test]
fn test_incomplete_doc_fails_validation() {
    let home = make_home();
    let project = tempfile::tempdir().expect("tempdir");
    init_repo(project.path(), home.path());
    fs::write(
        project.path().join("DIFFLENS.md"),
        "# App\n\n## Development Server\n\nsee the wiki\n",
    )
    .expect("write doc");
    fs::write(project.path().join("index.html"), "<html></html>\n").expect("write source");

    let out = run_in(
        home.path(),
        project.path(),
        &["--dry-run", "--skip-update-check"],
    );
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Command:"));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("incomplete"));
}

#[test]
fn test_outside_git_repo_fails() {
    let home = make_home();
    let project = tempfile::tempdir().expect("tempdir");
    fs::write(project.path().join("DIFFLENS.md"), VALID_DOC).expect("write doc");

    let out = run_in(home.path(), project.path(), &["--skip-update-check"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("git repository"));
}
