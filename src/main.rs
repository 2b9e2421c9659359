use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gh_app_git_token::actions::{ActionOutput, WorkflowCommands};
use gh_app_git_token::env::ProcessEnvironment;
use gh_app_git_token::git::SystemCommandRunner;
use gh_app_git_token::github::GitHubClient;
use gh_app_git_token::redact::{RedactingMakeWriter, Redactor};
use gh_app_git_token::{Error, Inputs, RawInputs, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub App ID
    #[arg(short, long, env = "INPUT_APP-ID")]
    app_id: Option<String>,

    /// GitHub App private key (PEM, PKCS#1 or PKCS#8)
    #[arg(long, env = "INPUT_PRIVATE-KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Path to GitHub App's private key PEM file, used instead of --private-key
    #[arg(short, long)]
    key_path: Option<PathBuf>,

    /// GitHub App Installation ID; looked up when omitted
    #[arg(short, long, env = "INPUT_INSTALLATION-ID")]
    installation_id: Option<String>,

    /// Rewrite https://github.com/ in the global git config to use the token
    #[arg(long, env = "INPUT_SET-GIT-CREDENTIALS")]
    set_git_credentials: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let redactor = Redactor::new();
    init_logging(args.log_level.as_deref(), &redactor);

    let env = ProcessEnvironment;
    let mut output = match WorkflowCommands::from_env(&env) {
        Ok(output) => output,
        Err(error) => {
            tracing::error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    match execute(args, &env, &mut output, &redactor).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            let message = redactor.redact(&error.to_string());
            tracing::error!(installation_state = error.is_installation_state(), "{message}");
            if let Err(write_error) = output.error(&message) {
                tracing::error!("failed to report failure to the runner: {write_error}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn execute(
    args: Args,
    env: &ProcessEnvironment,
    output: &mut WorkflowCommands<std::io::Stdout>,
    redactor: &Redactor,
) -> Result<gh_app_git_token::Outcome> {
    let private_key = match &args.key_path {
        Some(path) => Some(fs::read_to_string(path).map_err(|error| {
            Error::invalid_input(
                "private-key",
                format!("failed to read {}: {error}", path.display()),
            )
        })?),
        None => args.private_key,
    };

    let inputs = Inputs::from_raw(RawInputs {
        app_id: args.app_id,
        private_key,
        installation_id: args.installation_id,
        set_git_credentials: args.set_git_credentials,
        api_url: args.api_url,
    })?;

    let provider = GitHubClient::new(&inputs.api_url, env)
        .map_err(|error| anyhow::anyhow!("failed to build HTTP client: {error}"))?;

    gh_app_git_token::run(&inputs, &provider, output, &SystemCommandRunner, redactor).await
}

fn init_logging(log_level: Option<&str>, redactor: &Redactor) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(RedactingMakeWriter::new(std::io::stderr, redactor.clone())),
        )
        .init();
}
