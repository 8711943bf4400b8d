//! Interactive credential and defaults management.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password, Select};
use difflens_transcript::style;

use crate::config::{self, GlobalConfig};

const API_KEY_PREFIX: &str = "sk-ant-api";
const OAUTH_TOKEN_PREFIX: &str = "sk-ant-oat";

pub fn run_config() -> Result<()> {
    let mut config = config::load_config()?;
    println!("{}", style::banner("difflens config"));
    show_credentials(&config);

    loop {
        let items = [
            "Set API key",
            "Set OAuth token",
            "Set default branch",
            "Show credentials",
            "Clear credentials",
            "Done",
        ];
        let choice = Select::new()
            .with_prompt("What would you like to do?")
            .items(&items)
            .default(0)
            .interact()
            .context("config menu aborted")?;

        match choice {
            0 => set_api_key(&mut config)?,
            1 => set_oauth_token(&mut config)?,
            2 => set_default_branch(&mut config)?,
            3 => show_credentials(&config),
            4 => clear_credentials(&mut config)?,
            _ => break,
        }
    }
    Ok(())
}

fn set_api_key(config: &mut GlobalConfig) -> Result<()> {
    let key: String = Password::new()
        .with_prompt("API key (sk-ant-api...)")
        .allow_empty_password(true)
        .interact()
        .context("input aborted")?;
    let key = key.trim().to_string();
    if key.is_empty() {
        println!("{}", style::info_line("nothing entered; keeping the current key"));
        return Ok(());
    }
    if !key.starts_with(API_KEY_PREFIX) {
        println!(
            "{}",
            style::warning_line(&format!(
                "that does not look like an API key (expected a {API_KEY_PREFIX}... prefix); not saved"
            ))
        );
        return Ok(());
    }
    config.auth.api_key = key;
    config::save_config(config)?;
    println!("{}", style::success_line("API key saved"));
    Ok(())
}

fn set_oauth_token(config: &mut GlobalConfig) -> Result<()> {
    let token: String = Password::new()
        .with_prompt("OAuth token (sk-ant-oat...)")
        .allow_empty_password(true)
        .interact()
        .context("input aborted")?;
    let token = token.trim().to_string();
    if token.is_empty() {
        println!("{}", style::info_line("nothing entered; keeping the current token"));
        return Ok(());
    }
    if !token.starts_with(OAUTH_TOKEN_PREFIX) {
        println!(
            "{}",
            style::warning_line(&format!(
                "that does not look like an OAuth token (expected a {OAUTH_TOKEN_PREFIX}... prefix); not saved"
            ))
        );
        return Ok(());
    }
    config.auth.oauth_token = token;
    config::save_config(config)?;
    println!("{}", style::success_line("OAuth token saved"));
    Ok(())
}

fn set_default_branch(config: &mut GlobalConfig) -> Result<()> {
    let branch: String = Input::new()
        .with_prompt("Default branch to diff against (empty = uncommitted changes)")
        .allow_empty(true)
        .interact_text()
        .context("input aborted")?;
    let branch = branch.trim().to_string();
    config.default_branch = if branch.is_empty() { None } else { Some(branch) };
    config::save_config(config)?;
    println!("{}", style::success_line("default branch saved"));
    Ok(())
}

fn show_credentials(config: &GlobalConfig) {
    println!("API key:     {}", mask(&config.auth.api_key));
    println!("OAuth token: {}", mask(&config.auth.oauth_token));
    println!(
        "Branch:      {}",
        config.default_branch.as_deref().unwrap_or("(uncommitted changes)")
    );
    if let Ok(path) = config::config_path() {
        println!("Stored in:   {}", path.display());
    }
    if !config.auth.oauth_token.is_empty() && !config.auth.api_key.is_empty() {
        println!(
            "{}",
            style::info_line("both credentials set; the OAuth token is preferred")
        );
    }
}

fn clear_credentials(config: &mut GlobalConfig) -> Result<()> {
    if config.auth.api_key.is_empty() && config.auth.oauth_token.is_empty() {
        println!("{}", style::info_line("no credentials stored"));
        return Ok(());
    }
    let confirmed = Confirm::new()
        .with_prompt("Remove the stored API key and OAuth token?")
        .default(false)
        .interact()
        .context("confirmation aborted")?;
    if !confirmed {
        return Ok(());
    }
    config.auth.api_key.clear();
    config.auth.oauth_token.clear();
    config::save_config(config)?;
    println!("{}", style::success_line("credentials cleared"));
    Ok(())
}

/// First ten and last four characters of a secret, enough to recognize it
/// without exposing it.
fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    if secret.len() <= 14 || !secret.is_ascii() {
        return "****".to_string();
    }
    format!("{}...{}", &secret[..10], &secret[secret.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_prefix_and_tail() {
        assert_eq!(mask("sk-ant-api03-abcdefgh-wxyz"), "sk-ant-api...wxyz");
    }

    #[test]
    fn test_mask_short_and_empty_secrets() {
        assert_eq!(mask(""), "(not set)");
        assert_eq!(mask("sk-short"), "****");
    }

    #[test]
    fn test_mask_never_panics_on_non_ascii() {
        assert_eq!(mask("ключключключключключ"), "****");
    }
}
