//! Per-run inputs.

use std::path::PathBuf;

/// Everything a run needs besides the manifest. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Version the new branch is cut from, e.g. `1.40.0-wmf.0` or `master`.
    pub old_version: String,
    /// Prefix prepended to version identifiers to form branch names.
    pub branch_prefix: String,
    /// Version being created, e.g. `1.40.0-wmf.1`.
    pub new_version: String,
    /// Base URL or path every repository name is relative to.
    pub repo_path: String,
    /// Where the core repository is cloned from.
    pub source_clone_path: String,
    /// Branch name used verbatim when `old_version` names it.
    pub branch_from: String,
    pub dry_run: bool,
    /// Resume marker: repositories up to and including it are skipped.
    pub start_from: Option<String>,
    /// Scratch directory dependent repositories are cloned into.
    pub work_dir: PathBuf,
    /// Directory (under `work_dir`) holding the core checkout.
    pub branch_dir: String,
}

impl RunConfig {
    /// Full name of the branch being created.
    pub fn new_branch(&self) -> String {
        format!("{}{}", self.branch_prefix, self.new_version)
    }

    /// Branch the core repository is cloned at.
    pub fn source_branch(&self) -> String {
        if self.old_version == self.branch_from {
            self.branch_from.clone()
        } else {
            format!("{}{}", self.branch_prefix, self.old_version)
        }
    }

    /// Remote location of a repository: `repo_path/name`.
    pub fn remote_for(&self, name: &str) -> String {
        format!("{}/{}", self.repo_path.trim_end_matches('/'), name)
    }

    /// Location of the core checkout.
    pub fn core_dir(&self) -> PathBuf {
        self.work_dir.join(&self.branch_dir)
    }
}
