//! Read-only repository queries.

use super::LS_REMOTE_NO_MATCH;
use crate::error::Result;
use crate::process::{CommandLine, ProcessRunner};
use std::collections::BTreeSet;
use std::path::Path;

/// Read-only git queries. Any unexpected exit status is fatal.
#[derive(Clone, Copy)]
pub struct Probe<'a> {
    runner: &'a ProcessRunner,
}

impl<'a> Probe<'a> {
    pub fn new(runner: &'a ProcessRunner) -> Self {
        Self { runner }
    }

    /// Whether `dir` is the top of a git working copy.
    pub fn is_working_copy(&self, dir: &Path) -> bool {
        dir.join(".git").exists()
    }

    /// Name of the checked-out branch, or an empty string on a detached HEAD.
    pub fn current_branch(&self, repo_dir: &Path) -> Result<String> {
        Ok(self
            .branch_lines(repo_dir)?
            .into_iter()
            .find_map(|(current, name)| current.then_some(name))
            .unwrap_or_default())
    }

    /// Every local branch.
    pub fn local_branches(&self, repo_dir: &Path) -> Result<BTreeSet<String>> {
        Ok(self
            .branch_lines(repo_dir)?
            .into_iter()
            .map(|(_, name)| name)
            .collect())
    }

    /// Whether `remote_url` has a branch called `name`.
    ///
    /// "No matching ref" is a normal negative answer, not a failure.
    pub fn remote_has_branch(&self, cwd: &Path, remote_url: &str, name: &str) -> Result<bool> {
        let cmd = CommandLine::git(["ls-remote", "--exit-code", "--heads", remote_url, name]);
        let result = self
            .runner
            .run_accepting(cwd, &cmd, &[0, LS_REMOTE_NO_MATCH])?;
        Ok(result.exit_code != LS_REMOTE_NO_MATCH)
    }

    /// Upstream of a local branch (e.g. `origin/wmf/1.40.0-wmf.1`), if any.
    pub fn tracking_branch_of(&self, repo_dir: &Path, name: &str) -> Result<Option<String>> {
        let cmd = CommandLine::git([
            "for-each-ref".to_string(),
            "--format=%(upstream:short)".to_string(),
            format!("refs/heads/{}", name),
        ]);
        let result = self.runner.run_with_retry(repo_dir, &cmd)?;
        let upstream = result.stdout_trimmed();
        Ok((!upstream.is_empty()).then(|| upstream.to_string()))
    }

    /// Commit id HEAD points at.
    pub fn head_revision(&self, repo_dir: &Path) -> Result<String> {
        let result = self
            .runner
            .run_with_retry(repo_dir, &CommandLine::git(["rev-parse", "HEAD"]))?;
        Ok(result.stdout_trimmed().to_string())
    }

    /// Commits reachable from `reference` but not from HEAD, one per line.
    ///
    /// Remote refs are refreshed first. Empty output means HEAD is in sync.
    pub fn divergence_log(&self, repo_dir: &Path, reference: &str) -> Result<String> {
        self.runner
            .run_with_retry(repo_dir, &CommandLine::git(["fetch", "-q", super::ORIGIN]))?;
        let range = format!("HEAD..{}", reference);
        let result = self
            .runner
            .run_with_retry(repo_dir, &CommandLine::git(["log", "--oneline", &range]))?;
        Ok(result.stdout_trimmed().to_string())
    }

    /// `git status --porcelain` output, untrimmed. Non-empty means changes.
    pub fn working_tree_changes(&self, repo_dir: &Path) -> Result<String> {
        let result = self
            .runner
            .run_with_retry(repo_dir, &CommandLine::git(["status", "--porcelain"]))?;
        Ok(result.stdout)
    }

    /// URL configured for `remote`, if the remote exists.
    pub fn remote_url(&self, repo_dir: &Path, remote: &str) -> Result<Option<String>> {
        let key = format!("remote.{}.url", remote);
        // `git config --get` exits 1 when the key is unset.
        let result = self.runner.run_accepting(
            repo_dir,
            &CommandLine::git(["config", "--get", &key]),
            &[0, 1],
        )?;
        let url = result.stdout_trimmed();
        Ok((result.success() && !url.is_empty()).then(|| url.to_string()))
    }

    /// Whether `.gitmodules` already registers a submodule at `path`.
    pub fn has_submodule(&self, repo_dir: &Path, path: &str) -> Result<bool> {
        if !repo_dir.join(".gitmodules").exists() {
            return Ok(false);
        }
        let result = self.runner.run_accepting(
            repo_dir,
            &CommandLine::git([
                "config",
                "-f",
                ".gitmodules",
                "--get-regexp",
                r"^submodule\..*\.path$",
            ]),
            &[0, 1],
        )?;
        Ok(result
            .stdout
            .lines()
            .filter_map(|line| line.split_once(' '))
            .any(|(_, p)| p.trim() == path))
    }

    fn branch_lines(&self, repo_dir: &Path) -> Result<Vec<(bool, String)>> {
        let cmd = CommandLine::git([
            "for-each-ref",
            "--format=%(HEAD) %(refname:short)",
            "refs/heads/",
        ]);
        let result = self.runner.run_with_retry(repo_dir, &cmd)?;
        Ok(parse_branch_lines(&result.stdout))
    }
}

/// Parse `%(HEAD) %(refname:short)` lines: `* name` marks the current branch.
fn parse_branch_lines(output: &str) -> Vec<(bool, String)> {
    output
        .lines()
        .filter_map(|line| {
            let (marker, name) = line.split_at_checked(1)?;
            let name = name.trim();
            (!name.is_empty()).then(|| (marker == "*", name.to_string()))
        })
        .collect()
}
