//! Command implementations for relbranch.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod branch;
mod plan;
mod setup;
mod styles;


use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
///
/// `noisy` lets git print progress (the `-q` flags are dropped).
pub fn dispatch(command: Command, noisy: bool) -> Result<()> {
    match command {
        Command::Branch(args) => branch::cmd_branch(&args, noisy),
        Command::Plan(args) => plan::cmd_plan(&args),
        Command::Styles => styles::cmd_styles(),
    }
}
