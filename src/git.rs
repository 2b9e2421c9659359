use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::github::InstallationToken;
use crate::redact::Redactor;

const GITHUB_HOST: &str = "github.com";
const TOKEN_USER: &str = "x-access-token";

/// Outcome of a configuration step that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitCredentialState {
    Skipped,
    Configured,
}

/// Result of running an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr: String,
}

/// Runs external programs. Arguments are passed as a vector, never through
/// a shell.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutcome>;
}

/// [`CommandRunner`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutcome> {
        let output = Command::new(program).args(args).output().await?;
        Ok(CommandOutcome {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// The `git` arguments that install the credential rewrite for `token`.
pub fn config_args(token: &str) -> Vec<String> {
    vec![
        "config".to_string(),
        "--global".to_string(),
        format!("url.https://{TOKEN_USER}:{token}@{GITHUB_HOST}/.insteadOf"),
        format!("https://{GITHUB_HOST}/"),
    ]
}

/// Install the credential rewrite when `enabled`, otherwise do nothing.
///
/// Error messages are passed through `redactor`, so any echo of the token in
/// git's stderr is masked.
pub async fn configure<R>(
    enabled: bool,
    token: &InstallationToken,
    runner: &R,
    redactor: &Redactor,
) -> Result<GitCredentialState>
where
    R: CommandRunner + ?Sized,
{
    if !enabled {
        tracing::info!("Skipping git credential configuration");
        return Ok(GitCredentialState::Skipped);
    }

    let outcome = runner
        .run("git", &config_args(token.value()))
        .await
        .map_err(|error| {
            Error::CredentialConfigurationFailure(format!("failed to run git: {error}"))
        })?;

    if !outcome.success {
        let status = outcome
            .code
            .map_or_else(|| "a signal".to_string(), |code| format!("status {code}"));
        let stderr = redactor.redact(outcome.stderr.trim());
        return Err(Error::CredentialConfigurationFailure(if stderr.is_empty() {
            format!("git config exited with {status}")
        } else {
            format!("git config exited with {status}: {stderr}")
        }));
    }

    tracing::info!("Git credentials configured successfully");
    Ok(GitCredentialState::Configured)
}
