//! Raw command execution with captured output.

use crate::error::{BranchError, Result};
use std::fmt;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Create a command line for an arbitrary program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Create a `git` command line with the given arguments.
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("git").args(args)
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Remove every occurrence of `flag` (used to drop `-q` in noisy mode).
    pub fn without(mut self, flag: &str) -> Self {
        self.args.retain(|a| a != flag);
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        write!(f, "{}", shell_words::join(words))
    }
}

/// Outcome of a command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit status; -1 when the process was terminated by a signal.
    pub exit_code: i32,
    /// Complete standard output, untrimmed.
    pub stdout: String,
    /// Complete standard error, untrimmed.
    pub stderr: String,
    /// How many times the command ran before this result (0 when suppressed).
    pub attempts: u32,
}

impl CommandResult {
    /// A result with the given exit code and output.
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            attempts: 1,
        }
    }

    /// Successful result with empty output.
    pub fn ok() -> Self {
        Self::new(0, "", "")
    }

    /// Result returned for a command that dry-run mode did not execute.
    pub fn suppressed() -> Self {
        Self {
            attempts: 0,
            ..Self::ok()
        }
    }

    fn from_output(output: &Output) -> Self {
        Self::new(
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        )
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout with surrounding whitespace removed.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Something that can run a command to completion.
///
/// Implementations must drain stdout and stderr fully before returning.
pub trait Executor {
    fn execute(&self, cwd: &Path, command: &CommandLine) -> Result<CommandResult>;
}

/// Executor backed by `std::process::Command`.
///
/// `Command::output` reads both pipes concurrently, so a child that fills
/// one pipe while we wait on the other cannot deadlock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, cwd: &Path, command: &CommandLine) -> Result<CommandResult> {
        let output = Command::new(command.program())
            .args(command.arguments())
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                BranchError::Io(format!(
                    "failed to execute {} in '{}': {}",
                    command.program(),
                    cwd.display(),
                    e
                ))
            })?;

        Ok(CommandResult::from_output(&output))
    }
}
