//! Exit code constants for the relbranch CLI.
//!
//! Every failure is fatal and ends the run with a nonzero status; the
//! distinct codes only tell an operator which kind of failure stopped it:
//! - 0: Success
//! - 1: User error (bad args, unreadable or invalid manifest)
//! - 2: Precondition violation (conflicting clone, missing marker)
//! - 3: Command failure (git exited nonzero after all retries, I/O error)
//! - 4: Review server failure (HTTP or response decoding)
//! - 5: Authorization or configuration gap (read-only client, no endpoint)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or an invalid repository manifest.
pub const USER_ERROR: i32 = 1;

/// A precondition of the run does not hold.
pub const PRECONDITION_FAILURE: i32 = 2;

/// An external command failed after exhausting its retries.
pub const COMMAND_FAILURE: i32 = 3;

/// The review server rejected a request or answered with garbage.
pub const REMOTE_FAILURE: i32 = 4;

/// A mutating call was attempted without authorization or configuration.
pub const AUTHORIZATION_FAILURE: i32 = 5;
