//! CLI argument parsing for relbranch.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// relbranch: cut a release branch of a core repository and everything
/// branched alongside it.
///
/// Dependent repositories (extensions, skins, libraries) each get the new
/// branch first; the core repository is then branched, the dependents are
/// attached as submodules pinned to the new branch, the version marker is
/// rewritten, and the result is pushed.
#[derive(Parser, Debug)]
#[command(name = "relbranch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show debug output and let git report progress.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for relbranch.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the new branch everywhere and push it.
    ///
    /// Safe to re-run: repositories that already have the branch are
    /// reused, and --continue-from skips the ones finished by an earlier
    /// attempt.
    Branch(BranchArgs),

    /// Show which repositories a run would skip and which it would branch.
    ///
    /// Executes no commands.
    Plan(BranchArgs),

    /// List the available branch styles.
    Styles,
}

/// How new branches are created.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    /// Local `git checkout -b` and push.
    Git,
    /// The review server's REST API.
    Api,
}

/// Arguments shared by `branch` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct BranchArgs {
    /// Branch style (see `relbranch styles`).
    pub style: String,

    /// Version to create, e.g. 1.40.0-wmf.1.
    #[arg(long = "new", value_name = "VERSION")]
    pub new_version: String,

    /// Version to branch from.
    #[arg(long = "old", value_name = "VERSION", default_value = "master")]
    pub old_version: String,

    /// Branch used verbatim (no prefix) when --old names it.
    #[arg(long, value_name = "BRANCH", default_value = "master")]
    pub branch_from: String,

    /// Prefix for branch names; defaults to the style's prefix.
    #[arg(long, value_name = "PREFIX")]
    pub branch_prefix: Option<String>,

    /// Where to clone the core repository from; defaults to its canonical remote.
    #[arg(long, value_name = "CLONE")]
    pub path: Option<String>,

    /// Repository manifest; defaults to the style's file in the current directory.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Resume after a failure, skipping every repository up to and including NAME.
    #[arg(long, value_name = "NAME")]
    pub continue_from: Option<String>,

    /// Log write operations instead of performing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Branch creation strategy; defaults to the manifest's.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Scratch directory repositories are cloned into.
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Review server the repositories live on, e.g. https://gerrit.example.org/r.
    #[arg(long, value_name = "URL")]
    pub review_host: Option<String>,

    /// Directory of the release branch checkout (tarball style).
    #[arg(long, value_name = "DIR")]
    pub release_branch: Option<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
