//! External command execution.
//!
//! Every git invocation made during a run goes through [`ProcessRunner`],
//! which logs the command line and its output, retries failures with a fixed
//! backoff, and suppresses write commands in dry-run mode. Commands always
//! receive an explicit working directory; the process-wide current directory
//! is never changed. [`DirStack`] tracks where the orchestrator "is" and
//! guarantees that every descent is undone on scope exit.

mod dirstack;
mod executor;
mod runner;

pub use dirstack::{DirGuard, DirStack};
pub use executor::{CommandLine, CommandResult, Executor, SystemExecutor};
pub use runner::{ProcessRunner, RetryPolicy};
