//! Error types for the relbranch CLI.
//!
//! Uses thiserror for derive macros. Every variant is fatal: errors bubble
//! to `main`, which prints one message and exits with [`BranchError::exit_code`].

use crate::exit_codes;
use thiserror::Error;

/// Main error type for branching operations.
#[derive(Error, Debug)]
pub enum BranchError {
    /// Invalid arguments or manifest contents.
    #[error("{0}")]
    UserError(String),

    /// The run cannot continue because something on disk or in the
    /// manifest is not in the expected shape.
    #[error("{0}")]
    Precondition(String),

    /// An external command kept failing.
    #[error("`{command}` exited with status {code} after {attempts} attempt(s){}", stderr_suffix(.stderr))]
    CommandFailed {
        /// The full command line that failed.
        command: String,
        /// Exit status of the last attempt (-1 when killed by a signal).
        code: i32,
        /// Number of attempts made.
        attempts: u32,
        /// Trimmed stderr of the last attempt.
        stderr: String,
    },

    /// Registering a submodule failed.
    #[error("failed to add submodule '{name}': {source}")]
    Submodule {
        /// Submodule path inside the core repository.
        name: String,
        /// The underlying failure.
        #[source]
        source: Box<BranchError>,
    },

    /// Filesystem operation failed.
    #[error("{0}")]
    Io(String),

    /// The review server answered with an error or an unparseable body.
    #[error("review server: {0}")]
    RemoteService(String),

    /// A mutating call was attempted on a read-only client.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// A service was used before it was configured.
    #[error("not configured: {0}")]
    Unconfigured(String),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

impl BranchError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BranchError::UserError(_) => exit_codes::USER_ERROR,
            BranchError::Precondition(_) => exit_codes::PRECONDITION_FAILURE,
            BranchError::CommandFailed { .. } | BranchError::Io(_) => exit_codes::COMMAND_FAILURE,
            BranchError::Submodule { source, .. } => source.exit_code(),
            BranchError::RemoteService(_) => exit_codes::REMOTE_FAILURE,
            BranchError::Unauthorized(_) | BranchError::Unconfigured(_) => {
                exit_codes::AUTHORIZATION_FAILURE
            }
        }
    }
}

impl From<reqwest::Error> for BranchError {
    fn from(err: reqwest::Error) -> Self {
        BranchError::RemoteService(err.to_string())
    }
}

/// Result type alias for branching operations.
pub type Result<T> = std::result::Result<T, BranchError>;
