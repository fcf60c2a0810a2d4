//! Git operations used while branching.
//!
//! [`Probe`] answers read-only questions about a working copy or a remote;
//! [`Mutator`] changes repository state. Both issue discrete git commands
//! through the shared [`ProcessRunner`](crate::process::ProcessRunner), so
//! every call is logged and retried, and pushes honour dry-run mode.
//!
//! Every operation takes the directory it acts on explicitly.

mod mutate;
mod probe;

pub use mutate::Mutator;
pub use probe::Probe;

/// Name of the remote every clone pushes to.
pub const ORIGIN: &str = "origin";

/// `ls-remote --exit-code` status meaning "talked to the remote, no such ref".
pub const LS_REMOTE_NO_MATCH: i32 = 2;
