//! External commands (interpreter probes, Django bootstrap, venv, pip)
//!
//! Every subprocess goes through a [`CommandRunner`], so the mission can be
//! driven end to end in tests without a Python toolchain.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

/// Environment variable selecting the Python interpreter
pub const PYTHON_ENV: &str = "INIT_APP_PYTHON";

pub const DEFAULT_PYTHON: &str = "python3";

/// Upper bound for a single command; dependency installation is the slow one
const COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Interpreter to use, from the environment or the default
pub fn python_from_env() -> String {
    std::env::var(PYTHON_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PYTHON.to_string())
}

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// First non-empty line of stderr, falling back to stdout
    pub fn summary(&self) -> String {
        self.stderr
            .lines()
            .chain(self.stdout.lines())
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("exited with a non-zero status")
            .to_string()
    }
}

/// Runs external commands
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run to completion, capturing output. `Err` means the program could not run at all.
    async fn run(&self, command: &ExternalCommand) -> io::Result<CommandOutput>;

    /// Version-style probe: trimmed stdout (or stderr) when the command succeeds
    async fn probe(&self, command: &ExternalCommand) -> Option<String> {
        match self.run(command).await {
            Ok(out) if out.success => {
                let text = if out.stdout.trim().is_empty() {
                    out.stderr
                } else {
                    out.stdout
                };
                Some(text.lines().next().unwrap_or("").trim().to_string())
            }
            _ => None,
        }
    }
}

impl<R: CommandRunner> CommandRunner for &R {
    async fn run(&self, command: &ExternalCommand) -> io::Result<CommandOutput> {
        (**self).run(command).await
    }
}

/// Runs commands as real subprocesses
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self {
            timeout: COMMAND_TIMEOUT,
        }
    }
}

impl SystemRunner {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ExternalCommand) -> io::Result<CommandOutput> {
        debug!("Running {}", command);
        let mut cmd = TokioCommand::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("timed out after {} seconds", self.timeout.as_secs()),
                ))
            }
        };

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
