use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_AGENT_COMMAND: &str = "claude";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GlobalConfig {
    /// Ref to diff against when `--branch` is not given. Unset means the
    /// uncommitted working tree.
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub update: UpdateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub oauth_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_command")]
    pub command: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Extra flags appended to every agent invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateConfig {
    #[serde(default)]
    pub skip_check: bool,
}

fn default_agent_command() -> String {
    DEFAULT_AGENT_COMMAND.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: default_agent_command(),
            model: None,
            extra_args: Vec::new(),
        }
    }
}

/// Get the config directory path (~/.config/difflens/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("difflens"))
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load config from disk, returning defaults when the file is missing.
pub fn load_config() -> Result<GlobalConfig> {
    load_from(&config_path()?)
}

fn load_from(path: &Path) -> Result<GlobalConfig> {
    if !path.exists() {
        return Ok(GlobalConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    Ok(config)
}

/// Persist config. The file holds credentials, so it is owner-only.
pub fn save_config(config: &GlobalConfig) -> Result<()> {
    save_to(config, &config_path()?)
}

fn save_to(config: &GlobalConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir at {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
    }
    Ok(())
}

/// API key to inject into the agent environment. A key already present in
/// the environment wins by being inherited, so nothing is injected then.
pub fn api_key_for_session(config: &GlobalConfig) -> Option<String> {
    if std::env::var("ANTHROPIC_API_KEY").is_ok_and(|v| !v.trim().is_empty()) {
        return None;
    }
    let key = config.auth.api_key.trim();
    if key.is_empty() { None } else { Some(key.to_string()) }
}

/// OAuth token to inject, same environment-wins rule as the API key.
pub fn oauth_token_for_session(config: &GlobalConfig) -> Option<String> {
    if std::env::var("CLAUDE_CODE_OAUTH_TOKEN").is_ok_and(|v| !v.trim().is_empty()) {
        return None;
    }
    let token = config.auth.oauth_token.trim();
    if token.is_empty() { None } else { Some(token.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.agent.command, "claude");
        assert!(config.default_branch.is_none());
        assert!(!config.update.skip_check);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_branch = \"main\"\n\n[auth]\napi_key = \"sk-ant-api-test\"\n").unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.default_branch.as_deref(), Some("main"));
        assert_eq!(config.auth.api_key, "sk-ant-api-test");
        assert_eq!(config.agent.command, "claude");
        assert!(config.auth.oauth_token.is_empty());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = GlobalConfig::default();
        config.auth.oauth_token = "sk-ant-oat-test".to_string();
        config.agent.model = Some("claude-sonnet-4-5".to_string());
        save_to(&config, &path).unwrap();

        let reloaded = load_from(&path).unwrap();
        assert_eq!(reloaded.auth.oauth_token, "sk-ant-oat-test");
        assert_eq!(reloaded.agent.model.as_deref(), Some("claude-sonnet-4-5"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        save_to(&GlobalConfig::default(), &path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(load_from(&path).is_err());
    }
}
