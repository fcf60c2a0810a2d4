//! Logged, retrying, dry-run aware command runner.

use super::executor::{CommandLine, CommandResult, Executor};
use crate::error::{BranchError, Result};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How often and how patiently a failing command is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Policy that runs a command exactly once.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

/// Runs external commands on behalf of the orchestrator.
pub struct ProcessRunner {
    executor: Box<dyn Executor>,
    policy: RetryPolicy,
    dry_run: bool,
    noisy: bool,
}

impl ProcessRunner {
    pub fn new(executor: impl Executor + 'static, policy: RetryPolicy, dry_run: bool) -> Self {
        Self {
            executor: Box::new(executor),
            policy,
            dry_run,
            noisy: false,
        }
    }

    /// In noisy mode `-q` is stripped from every command so git reports progress.
    pub fn noisy(mut self, noisy: bool) -> Self {
        self.noisy = noisy;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run a command once and return its result whatever the exit status.
    ///
    /// Only a failure to start the process is an error.
    pub fn run(&self, cwd: &Path, command: &CommandLine) -> Result<CommandResult> {
        let command = self.prepare(command);
        info!(cwd = %cwd.display(), "$ {}", command);

        let result = self.executor.execute(cwd, &command)?;

        for line in result.stdout.lines() {
            debug!("{}", line);
        }
        for line in result.stderr.lines() {
            warn!("{}", line);
        }

        Ok(result)
    }

    /// Run a command until it exits with status 0.
    ///
    /// After `max_attempts` failures the last exit status is returned as
    /// [`BranchError::CommandFailed`].
    pub fn run_with_retry(&self, cwd: &Path, command: &CommandLine) -> Result<CommandResult> {
        self.run_accepting(cwd, command, &[0])
    }

    /// Like [`run_with_retry`](Self::run_with_retry) but any status in
    /// `accepted` ends the loop, letting callers treat e.g. "no match" as a
    /// normal answer instead of a failure to retry.
    pub fn run_accepting(
        &self,
        cwd: &Path,
        command: &CommandLine,
        accepted: &[i32],
    ) -> Result<CommandResult> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let mut result = self.run(cwd, command)?;
            result.attempts = attempt;

            if accepted.contains(&result.exit_code) {
                return Ok(result);
            }

            if attempt >= max_attempts {
                return Err(BranchError::CommandFailed {
                    command: self.prepare(command).to_string(),
                    code: result.exit_code,
                    attempts: attempt,
                    stderr: result.stderr.trim().to_string(),
                });
            }

            warn!(
                "{} exited with status {}; sleeping for {}s (attempt {}/{})",
                command.program(),
                result.exit_code,
                self.policy.backoff.as_secs(),
                attempt,
                max_attempts
            );
            thread::sleep(self.policy.backoff);
        }
    }

    /// Run a state-changing command, or only log it when dry-run is active.
    pub fn run_if_not_dry_run(&self, cwd: &Path, command: &CommandLine) -> Result<CommandResult> {
        if self.dry_run {
            info!(cwd = %cwd.display(), "[dry-run] {}", self.prepare(command));
            return Ok(CommandResult::suppressed());
        }
        self.run_with_retry(cwd, command)
    }

    fn prepare(&self, command: &CommandLine) -> CommandLine {
        if self.noisy {
            command.clone().without("-q")
        } else {
            command.clone()
        }
    }
}
