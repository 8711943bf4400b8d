//! The default command: detect changed files, drive a capture session,
//! and render the live transcript.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use difflens_stream::{AgentSession, EventKind, SessionOptions};
use difflens_transcript::{Renderer, style};

use crate::changes::{self, Detection};
use crate::config::{self, GlobalConfig};
use crate::template;
use crate::update;
use crate::validate;

/// Per-project configuration document, at the repository root.
pub const CONFIG_DOC: &str = "DIFFLENS.md";
/// Where the agent is told to put captures, relative to the project.
pub const SCREENSHOT_DIR: &str = ".difflens/screenshots";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dir: String,
    pub branch: Option<String>,
    pub dry_run: bool,
    pub verbose: bool,
    pub debug: bool,
    pub skip_update_check: bool,
}

pub async fn run(opts: RunOptions) -> Result<()> {
    let work_dir = resolve_work_dir(&opts.dir)?;
    let global = config::load_config()?;

    if !opts.skip_update_check && !global.update.skip_check {
        update::check_for_update().await;
    }

    if !changes::is_git_repository(&work_dir) {
        bail!(
            "{} is not a git repository; change detection needs git",
            work_dir.display()
        );
    }

    let doc_path = work_dir.join(CONFIG_DOC);
    if !doc_path.exists() {
        bail!(
            "{CONFIG_DOC} not found in {}; run `difflens init` to generate it",
            work_dir.display()
        );
    }
    let doc = std::fs::read_to_string(&doc_path)
        .with_context(|| format!("Failed to read {}", doc_path.display()))?;

    let report = validate::validate_config_doc(&doc);
    for warning in &report.warnings {
        println!("{}", style::warning_line(warning));
    }
    if !report.is_valid() {
        for error in &report.errors {
            println!("{}", style::error_line(error));
        }
        bail!("{CONFIG_DOC} is incomplete; fix the sections above or re-run `difflens init`");
    }

    let branch = opts
        .branch
        .clone()
        .or_else(|| global.default_branch.clone())
        .unwrap_or_else(|| changes::UNCOMMITTED.to_string());

    let detection = detect_changes(&work_dir, &branch);
    if detection.files.is_empty() {
        println!(
            "{}",
            style::info_line(&format!(
                "no relevant changes against {}; nothing to capture",
                branch_label(&branch)
            ))
        );
        return Ok(());
    }

    println!(
        "{}",
        style::section(&format!("Changed files ({})", branch_label(&branch)))
    );
    for (i, file) in detection.files.iter().enumerate() {
        let prefix = if i == 0 {
            format!("{}{}", style::INDENT, style::TREE_NODE)
        } else {
            style::INDENT_CONT.to_string()
        };
        println!("{prefix}{}{}", style::cyan("◆ "), style::white(file));
    }
    if opts.verbose && detection.filtered_out > 0 {
        println!(
            "{}",
            style::dim(&format!(
                "{}{} more changed file(s) filtered as not UI-relevant",
                style::INDENT,
                detection.filtered_out
            ))
        );
    }

    let prompt = template::capture_prompt(&detection.files, &doc, SCREENSHOT_DIR);
    if opts.dry_run {
        println!("{}", style::section("Dry run"));
        println!("{}", style::dim("The capture session would receive this prompt:"));
        println!("\n{prompt}");
        return Ok(());
    }

    let session_opts = session_options(&global, &work_dir);
    let started = Instant::now();
    let outcome = drive_session(&prompt, &session_opts, &work_dir, opts.debug).await?;

    let screenshots = collect_screenshots(&work_dir);
    print_summary(&screenshots, &work_dir, started);

    if let Some(reason) = outcome.failure {
        bail!("capture session failed: {reason}");
    }
    if screenshots.is_empty() {
        bail!(
            "the session finished without capturing anything; check the dev server command in {CONFIG_DOC}"
        );
    }
    Ok(())
}

// ── Shared with init ────────────────────────────────────────────────────────

pub fn resolve_work_dir(dir: &str) -> Result<PathBuf> {
    let expanded = shellexpand::tilde(dir);
    let path = PathBuf::from(expanded.as_ref());
    path.canonicalize()
        .with_context(|| format!("Project directory {} does not exist", path.display()))
}

pub fn session_options(global: &GlobalConfig, work_dir: &Path) -> SessionOptions {
    let mut opts = SessionOptions::new(work_dir);
    let command = global.agent.command.trim();
    if !command.is_empty() {
        opts.command = shellexpand::tilde(command).into_owned();
    }
    opts.model = global.agent.model.clone();
    opts.extra_args = global.agent.extra_args.clone();
    opts.api_key = config::api_key_for_session(global);
    opts.oauth_token = config::oauth_token_for_session(global);
    opts
}

pub struct SessionOutcome {
    /// Why the session should count as failed, if it should.
    pub failure: Option<String>,
}

/// Run one agent session to completion, printing the transcript as it
/// streams.
pub async fn drive_session(
    prompt: &str,
    opts: &SessionOptions,
    work_dir: &Path,
    debug: bool,
) -> Result<SessionOutcome> {
    let mut session = AgentSession::start(prompt, opts)
        .await
        .context("Failed to start the agent session; is the agent CLI installed?")?;
    let mut renderer = Renderer::new(work_dir.to_string_lossy().into_owned()).with_debug(debug);
    let mut failure: Option<String> = None;

    while let Some(event) = session.next_event().await {
        if event.kind == EventKind::ResultSummary && event.is_error {
            let detail = event
                .text_blocks()
                .next()
                .unwrap_or("the agent reported an error")
                .to_string();
            failure = Some(detail);
        }
        let rendered = renderer.render(&event);
        if !rendered.is_empty() {
            print!("{rendered}");
            std::io::stdout().flush().ok();
        }
    }

    let status = session
        .wait()
        .await
        .context("Failed to reap the agent process")?;
    if failure.is_none() && !status.success() {
        failure = Some(format!("agent exited with {status}"));
    }
    Ok(SessionOutcome { failure })
}

// ── Pieces ──────────────────────────────────────────────────────────────────

fn detect_changes(work_dir: &Path, branch: &str) -> Detection {
    let mut spinner = style::Spinner::new();
    print!("{} detecting changes...", style::cyan(spinner.next_frame()));
    std::io::stdout().flush().ok();
    let detection = changes::detect(work_dir, branch);
    print!("{}", style::CLEAR_LINE);
    std::io::stdout().flush().ok();
    detection
}

fn branch_label(branch: &str) -> &str {
    if branch == changes::UNCOMMITTED {
        "uncommitted changes"
    } else {
        branch
    }
}

/// Captures under the screenshot directory, sorted, minus the probe shot.
fn collect_screenshots(work_dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/**/*.png", work_dir.join(SCREENSHOT_DIR).display());
    let Ok(paths) = glob::glob(&pattern) else {
        return Vec::new();
    };
    let mut shots: Vec<PathBuf> = paths
        .filter_map(|entry| entry.ok())
        .filter(|path| path.file_name().and_then(|n| n.to_str()) != Some("init.png"))
        .collect();
    shots.sort();
    shots
}

fn print_summary(screenshots: &[PathBuf], work_dir: &Path, started: Instant) {
    let rule = style::dim(&"━".repeat(60));
    println!("\n{rule}");
    if screenshots.is_empty() {
        println!("{}", style::warning_line("no screenshots captured"));
    } else {
        println!(
            "{}",
            style::success_line(&format!(
                "{} screenshot(s) captured in {:.1}s",
                screenshots.len(),
                started.elapsed().as_secs_f64()
            ))
        );
        println!(
            "{}",
            style::info_line(&format!("Output: {}", work_dir.join(SCREENSHOT_DIR).display()))
        );
        for shot in screenshots {
            let rel = shot.strip_prefix(work_dir).unwrap_or(shot);
            println!("{}{}", style::INDENT, style::gray(&rel.display().to_string()));
        }
    }
    println!("{rule}");
}
