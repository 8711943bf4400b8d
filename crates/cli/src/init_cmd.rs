//! `difflens init`: have the agent analyze the project and write
//! DIFFLENS.md.

use anyhow::{Context, Result, bail};
use dialoguer::Confirm;
use difflens_transcript::style;

use crate::config;
use crate::run_cmd::{CONFIG_DOC, drive_session, resolve_work_dir, session_options};
use crate::template;
use crate::validate;

pub struct InitOptions {
    pub dir: String,
    pub force: bool,
    pub debug: bool,
}

pub async fn run_init(opts: InitOptions) -> Result<()> {
    let work_dir = resolve_work_dir(&opts.dir)?;
    let global = config::load_config()?;

    let doc_path = work_dir.join(CONFIG_DOC);
    if doc_path.exists() && !opts.force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{CONFIG_DOC} already exists. Regenerate it?"))
            .default(false)
            .interact()
            .context("confirmation aborted")?;
        if !overwrite {
            println!("{}", style::info_line("keeping the existing file"));
            return Ok(());
        }
    }

    println!("{}", style::banner("difflens init"));
    println!(
        "{}",
        style::info_line(&format!(
            "analyzing {} to generate {CONFIG_DOC}...",
            work_dir.display()
        ))
    );

    let prompt = template::analyze_prompt(CONFIG_DOC);
    let session_opts = session_options(&global, &work_dir);
    let outcome = drive_session(&prompt, &session_opts, &work_dir, opts.debug).await?;
    if let Some(reason) = outcome.failure {
        bail!("analysis session failed: {reason}");
    }

    if !doc_path.exists() {
        bail!("the session finished but {CONFIG_DOC} was not written; check credentials with `difflens config`");
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
        bail!("generated {CONFIG_DOC} is incomplete; edit it by hand or re-run `difflens init`");
    }

    println!("{}", style::success_line(&format!("{CONFIG_DOC} created")));
    println!("{}", style::section("Next steps"));
    println!("  1. Review {CONFIG_DOC}, especially the dev server command");
    println!(
        "  2. Make some changes, then run {} to capture screenshots",
        style::bold("difflens")
    );
    Ok(())
}
