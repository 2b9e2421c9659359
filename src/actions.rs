//! Workflow command output.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::env::Environment;
use crate::error::{Error, Result};

/// Where masks, outputs and failure annotations go.
pub trait ActionOutput {
    /// Ask the runner to mask `secret` in all subsequent log output.
    fn add_mask(&mut self, secret: &str) -> io::Result<()>;

    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()>;

    /// Report the run as failed with `message`.
    fn error(&mut self, message: &str) -> io::Result<()>;
}

/// [`ActionOutput`] that speaks the workflow runner's command protocol.
pub struct WorkflowCommands<W> {
    stdout: W,
    output_file: Option<PathBuf>,
}

impl WorkflowCommands<io::Stdout> {
    /// Commands on stdout for the workflow runner this process runs under.
    ///
    /// Masks and outputs carry the token in the clear and only the runner
    /// hides them, so this fails unless `GITHUB_ACTIONS` is `true`.
    pub fn from_env(env: &impl Environment) -> Result<Self> {
        if env.var("GITHUB_ACTIONS").as_deref() != Some("true") {
            return Err(Error::invalid_input(
                "GITHUB_ACTIONS",
                "not running inside a workflow runner; refusing to print the token to stdout",
            ));
        }
        Ok(Self::new(
            io::stdout(),
            env.var("GITHUB_OUTPUT").map(PathBuf::from),
        ))
    }
}

impl<W: Write> WorkflowCommands<W> {
    pub fn new(stdout: W, output_file: Option<PathBuf>) -> Self {
        Self {
            stdout,
            output_file,
        }
    }

    pub fn into_inner(self) -> W {
        self.stdout
    }

    fn command(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.stdout, "{line}")?;
        self.stdout.flush()
    }
}

impl<W: Write> ActionOutput for WorkflowCommands<W> {
    fn add_mask(&mut self, secret: &str) -> io::Result<()> {
        self.command(&format!("::add-mask::{}", escape_data(secret)))
    }

    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        let Some(path) = self.output_file.clone() else {
            return self.command(&format!(
                "::set-output name={}::{}",
                escape_property(name),
                escape_data(value)
            ));
        };

        let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
        if name.contains(&delimiter) || value.contains(&delimiter) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "output contains the generated delimiter",
            ));
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        write!(file, "{name}<<{delimiter}\n{value}\n{delimiter}\n")
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        self.command(&format!("::error::{}", escape_data(message)))
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
