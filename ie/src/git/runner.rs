//! External command execution with logging and failure classification

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, info, warn};

/// Error types for external command execution
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Command failed (exit {code}): {command}")]
    CommandFailed { code: i32, command: String, stderr: String },

    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of one external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Full command line, for logs and error messages
    pub command: String,

    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,

    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code with signal termination reported as -1
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(-1)
    }
}

/// Process seam: spawns a program and captures its output
pub trait CommandRunner {
    fn execute(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, GitError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn execute(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, GitError> {
        (**self).execute(program, args, cwd)
    }
}

/// Runs commands as real child processes, blocking until they exit
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn execute(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, GitError> {
        let command = command_line(program, args);
        debug!(%command, ?cwd, "SystemRunner::execute: called");

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        Ok(CommandOutput {
            command,
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ")
}

/// Git bound to a working directory
pub struct Git<'r, R: CommandRunner> {
    runner: &'r R,
    workdir: PathBuf,
}

impl<'r, R: CommandRunner> Git<'r, R> {
    pub fn new(runner: &'r R, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    /// Run a git command, failing with [`GitError::CommandFailed`] on non-zero exit
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let output = self.exec(args)?;
        if !output.success() {
            if !output.stderr.trim().is_empty() {
                error!("{}", output.stderr.trim());
            }
            return Err(GitError::CommandFailed {
                code: output.exit_code(),
                command: output.command,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    /// Run a git command and hand back the output whatever the exit status
    pub fn probe(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let output = self.exec(args)?;
        if !output.success() && !output.stderr.trim().is_empty() {
            warn!("{}", output.stderr.trim());
        }
        Ok(output)
    }

    fn exec(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        info!("$ {}", command_line("git", args));
        let output = self.runner.execute("git", args, &self.workdir)?;
        if !output.stdout.trim().is_empty() {
            info!("{}", output.stdout.trim());
        }
        debug!(code = ?output.code, "Git::exec: finished");
        Ok(output)
    }
}
