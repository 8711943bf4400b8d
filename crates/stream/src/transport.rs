//! Launches the agent CLI and turns its stdout into a stream of events.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

use crate::event::Event;
use crate::wire::parse_line;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to launch agent '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("agent stdout was not captured")]
    MissingStdout,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// How to launch the agent CLI for one session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Agent executable, resolved through PATH.
    pub command: String,
    pub model: Option<String>,
    /// Extra flags appended verbatim after the built-in ones.
    pub extra_args: Vec<String>,
    pub work_dir: PathBuf,
    /// Injected as ANTHROPIC_API_KEY when set.
    pub api_key: Option<String>,
    /// Injected as CLAUDE_CODE_OAUTH_TOKEN when set.
    pub oauth_token: Option<String>,
}

impl SessionOptions {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: "claude".to_string(),
            model: None,
            extra_args: Vec::new(),
            work_dir: work_dir.into(),
            api_key: None,
            oauth_token: None,
        }
    }
}

/// A running agent process emitting stream-json on stdout.
pub struct AgentSession {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
}

impl AgentSession {
    /// Spawn the agent with a single prompt. Spawn failure is the only
    /// hard error here; everything after that degrades to warnings.
    pub async fn start(prompt: &str, opts: &SessionOptions) -> Result<Self> {
        let mut command = Command::new(&opts.command);
        command
            .arg("-p")
            .arg(prompt)
            .args(["--output-format", "stream-json", "--verbose"])
            .arg("--dangerously-skip-permissions")
            .current_dir(&opts.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(model) = &opts.model {
            command.args(["--model", model]);
        }
        command.args(&opts.extra_args);
        if let Some(key) = &opts.api_key {
            command.env("ANTHROPIC_API_KEY", key);
        }
        if let Some(token) = &opts.oauth_token {
            command.env("CLAUDE_CODE_OAUTH_TOKEN", token);
        }

        let mut child = command.spawn().map_err(|source| TransportError::Spawn {
            command: opts.command.clone(),
            source,
        })?;
        let stdout = child.stdout.take().ok_or(TransportError::MissingStdout)?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }

        Ok(Self {
            child,
            lines: BufReader::new(stdout).lines(),
        })
    }

    /// Next decodable event, skipping malformed lines. `None` once the
    /// agent closes stdout.
    pub async fn next_event(&mut self) -> Option<Event> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    tracing::trace!(target: "difflens::stream", raw = %line);
                    if let Some(event) = parse_line(&line) {
                        return Some(event);
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!("agent stdout read failed: {}", e);
                    return None;
                }
            }
        }
    }

    /// Reap the agent process and report its exit status.
    pub async fn wait(mut self) -> Result<ExitStatus> {
        Ok(self.child.wait().await?)
    }
}

/// Agent stderr is diagnostics, not transcript. Surface it through the
/// log so it lands on our stderr channel.
async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            tracing::warn!(target: "difflens::agent", "{}", trimmed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    /// A stand-in agent: a script that ignores its flags and prints
    /// whatever stream-json body the test hands it.
    #[cfg(unix)]
    fn fake_agent(dir: &std::path::Path, body: &str) -> SessionOptions {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-agent.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        let mut opts = SessionOptions::new(dir);
        opts.command = path.to_string_lossy().into_owned();
        opts
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reads_events_until_eof() {
        let dir = tempfile::tempdir().unwrap();
        let opts = fake_agent(
            dir.path(),
            r#"printf '%s\n' '{"type":"system","subtype":"init","tools":["Bash"]}' '{"type":"result","subtype":"success","duration_ms":10}'"#,
        );
        let mut session = AgentSession::start("unused", &opts).await.unwrap();

        let first = session.next_event().await.unwrap();
        assert_eq!(first.kind, EventKind::SessionInit);
        let second = session.next_event().await.unwrap();
        assert_eq!(second.kind, EventKind::ResultSummary);
        assert!(session.next_event().await.is_none());
        assert!(session.wait().await.unwrap().success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let opts = fake_agent(
            dir.path(),
            r#"printf '%s\n' 'garbage' '{"type":"assistant","message":{"content":[{"type":"text","text":"hi"}]}}'"#,
        );
        let mut session = AgentSession::start("unused", &opts).await.unwrap();

        let event = session.next_event().await.unwrap();
        assert_eq!(event.kind, EventKind::AssistantTurn);
        assert!(session.next_event().await.is_none());
        session.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let mut opts = SessionOptions::new(std::env::temp_dir());
        opts.command = "difflens-no-such-binary".to_string();
        let err = AgentSession::start("x", &opts).await.err().unwrap();
        assert!(matches!(err, TransportError::Spawn { .. }));
    }
}
