//! Subprocess execution.
//!
//! Commands never fail at the Rust level: a non-zero exit or a spawn error is
//! reported through [`ExecOutput::error`] so callers decide what is fatal.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::task_log::TaskLog;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// `node <script> <args..>`
    pub fn node_script(node: &str, script: &Path) -> Self {
        Self::new(node).arg(script.to_string_lossy())
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
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    /// Set when the command could not be spawned or exited non-zero.
    pub error: Option<String>,
}

impl ExecOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Error text followed by everything the command printed.
    pub fn failure_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|error| format!("{}\n{}\n{}", error, self.stdout, self.stderr))
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec, cwd: &Path) -> ExecOutput;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec, cwd: &Path) -> ExecOutput {
        debug!(command = %command, cwd = %cwd.display(), "Spawning command");

        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .output()
            .await;

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                if output.status.success() {
                    ExecOutput {
                        stdout,
                        stderr,
                        error: None,
                    }
                } else {
                    ExecOutput::failure(
                        format!("Command failed: {} ({})", command, output.status),
                        stdout,
                        stderr,
                    )
                }
            }
            Err(e) => ExecOutput::failure(
                format!("Failed to run {}: {}", command, e),
                String::new(),
                String::new(),
            ),
        }
    }
}

/// Runs `command` and records it in the task log: the command line and stdout
/// as info, stderr as error. Returns the failure message if the command failed.
pub async fn run_logged(
    runner: &dyn CommandRunner,
    command: &CommandSpec,
    cwd: &Path,
    log: &mut TaskLog,
) -> Option<String> {
    log.info(format!("Running: {}", command));
    let output = runner.run(command, cwd).await;
    if !output.stdout.is_empty() {
        log.info(output.stdout.as_str());
    }
    if !output.stderr.is_empty() {
        log.error(output.stderr.as_str());
    }
    output.failure_message()
}
